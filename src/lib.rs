//! costctl library
//!
//! Core functionality for the costctl CLI: EC2 instance discovery, on-demand
//! pricing, CPU utilization sampling, and cost-saving recommendations.

pub mod analyzer;
pub mod config;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod metrics;
pub mod output;
pub mod pricing;
pub mod recommend;
pub mod report;
pub mod savings;
pub mod session;

// Re-export commonly used types
pub use error::{CostctlError, Result};
pub use report::{FleetReport, InstanceReport};
