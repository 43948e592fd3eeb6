//! Error types for costctl
//!
//! Two error types: `CostctlError` (main error enum) and `ConfigError`
//! (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostctlError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The
//! conversion happens at the CLI boundary using `anyhow::Error::from` to
//! preserve error chains.
//!
//! This split exists because:
//! - Library code benefits from structured error types for programmatic handling
//! - CLI code benefits from `anyhow`'s context chains and user-friendly display
//!
//! ## When to Use Which Error
//!
//! - `ConfigError`: configuration parsing and validation issues
//!   - Automatically converted to `CostctlError::Config` via `#[from]`
//!
//! - `Credentials`: AWS session setup failures (no usable credentials,
//!   identity verification rejected). Always fatal; nothing can be analyzed
//!   without a working session.
//!
//! - `Aws`: AWS API failures that abort the run (instance discovery).
//!   Per-instance pricing and metrics failures never surface here; those
//!   degrade in place (fallback table, no-data) and are logged instead.
//!
//! - `Validation`: user input validation (instance type strings, export
//!   formats). Invalid input won't become valid, so these fail immediately.

use thiserror::Error;

/// Main error type for costctl
#[derive(Error, Debug)]
pub enum CostctlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("AWS SDK error: {0}")]
    Aws(String),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostctlError>;
