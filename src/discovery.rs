//! EC2 instance discovery
//!
//! One DescribeInstances sweep per run. Terminated instances and records
//! without an instance type are dropped at the source; everything else is
//! handed to the analyzer as an immutable record.

use aws_sdk_ec2::types::Instance;
use aws_sdk_ec2::Client as Ec2Client;
use serde::Serialize;

use crate::error::{CostctlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRecord {
    pub id: String,
    /// Value of the Name tag, if present.
    pub name: Option<String>,
    pub state: String,
    pub instance_type: String,
}

impl InstanceRecord {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// Discover EC2 instances visible to the session.
pub async fn list_instances(client: &Ec2Client) -> Result<Vec<InstanceRecord>> {
    let response = client
        .describe_instances()
        .send()
        .await
        .map_err(|e| CostctlError::Aws(format!("Failed to list EC2 instances: {}", e)))?;

    let mut records = Vec::new();
    for reservation in response.reservations() {
        for instance in reservation.instances() {
            if let Some(record) = record_from_instance(instance) {
                records.push(record);
            }
        }
    }
    Ok(records)
}

fn record_from_instance(instance: &Instance) -> Option<InstanceRecord> {
    let id = instance.instance_id()?.to_string();
    let instance_type = instance.instance_type().map(|t| format!("{}", t))?;

    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|s| format!("{}", s))
        .unwrap_or_else(|| "unknown".to_string());
    if state == "terminated" {
        return None;
    }

    let name = instance
        .tags()
        .iter()
        .find(|t| t.key() == Some("Name"))
        .and_then(|t| t.value())
        .map(|v| v.to_string());

    Some(InstanceRecord {
        id,
        name,
        state,
        instance_type,
    })
}
