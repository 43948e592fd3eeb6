//! CPU utilization sampling from CloudWatch
//!
//! One metric, fixed shape: `AWS/EC2` / `CPUUtilization` over a trailing
//! window in 1-hour buckets. The per-bucket averages are averaged and the
//! per-bucket maxima are maxed. No samples means `None`; an idle instance
//! reporting 0% is a different thing from an instance with no data.

use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Datapoint, Dimension, Statistic};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::warn;

/// Seconds per utilization bucket (1 hour).
const BUCKET_PERIOD_SECS: i32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuStats {
    /// Mean of the per-bucket averages over the window, percent.
    pub avg: f64,
    /// Highest per-bucket maximum over the window, percent.
    pub max: f64,
}

/// Sample CPU utilization for one instance over the trailing window.
///
/// Returns `None` when the query fails or yields no buckets (recently
/// launched instance, monitoring disabled, missing permissions). Errors are
/// logged and swallowed here; a metrics problem must never stop the run.
pub async fn cpu_utilization(
    client: &aws_sdk_cloudwatch::Client,
    instance_id: &str,
    lookback_days: u32,
) -> Option<CpuStats> {
    let end = Utc::now();
    let start = end - Duration::days(i64::from(lookback_days));

    let response = match client
        .get_metric_statistics()
        .namespace("AWS/EC2")
        .metric_name("CPUUtilization")
        .dimensions(
            Dimension::builder()
                .name("InstanceId")
                .value(instance_id)
                .build(),
        )
        .start_time(DateTime::from_secs(start.timestamp()))
        .end_time(DateTime::from_secs(end.timestamp()))
        .period(BUCKET_PERIOD_SECS)
        .statistics(Statistic::Average)
        .statistics(Statistic::Maximum)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Could not fetch metrics for {}: {}", instance_id, e);
            return None;
        }
    };

    summarize(response.datapoints())
}

fn summarize(datapoints: &[Datapoint]) -> Option<CpuStats> {
    let averages: Vec<f64> = datapoints.iter().filter_map(|d| d.average()).collect();
    let maxima: Vec<f64> = datapoints.iter().filter_map(|d| d.maximum()).collect();
    if averages.is_empty() || maxima.is_empty() {
        return None;
    }

    let avg = averages.iter().sum::<f64>() / averages.len() as f64;
    let max = maxima.iter().copied().fold(f64::MIN, f64::max);
    Some(CpuStats { avg, max })
}
