//! Fleet analysis driver
//!
//! One sequential pass: discover the fleet, then price, sample, and
//! recommend for each instance before folding into the summary. Discovery
//! failure aborts the run (there is nothing to analyze); every per-instance
//! failure degrades to an unknown for that instance alone and the loop
//! keeps going.

use tracing::{debug, warn};

use crate::discovery::{self, InstanceRecord};
use crate::error::Result;
use crate::metrics;
use crate::pricing::PriceBook;
use crate::recommend;
use crate::report::{build_instance_report, FleetReport, InstanceReport};
use crate::session::AwsSession;

pub struct AnalyzeOptions {
    /// Sample CloudWatch CPU utilization for running instances.
    pub check_metrics: bool,
    /// Resolve prices from the built-in table only.
    pub offline: bool,
    /// Utilization lookback window in days.
    pub lookback_days: u32,
    /// Average CPU% below which downsizing is suggested.
    pub low_cpu_threshold: f64,
    /// Average CPU% above which a capacity warning is flagged.
    pub high_cpu_threshold: f64,
}

/// Run the full advisory pass.
pub async fn analyze_fleet(session: &AwsSession, options: &AnalyzeOptions) -> Result<FleetReport> {
    let ec2 = session.ec2_client();
    let records = discovery::list_instances(&ec2).await?;
    debug!("discovered {} instance(s) in {}", records.len(), session.region);

    let mut prices = if options.offline {
        PriceBook::offline()
    } else {
        PriceBook::new(session.pricing_client())
    };
    let cloudwatch = session.cloudwatch_client();

    let mut instances = Vec::with_capacity(records.len());
    for record in &records {
        let report =
            analyze_instance(record, &mut prices, &cloudwatch, &session.region, options).await;
        instances.push(report);
    }

    Ok(FleetReport::assemble(
        session.region.clone(),
        options.check_metrics,
        options.offline,
        instances,
    ))
}

async fn analyze_instance(
    record: &InstanceRecord,
    prices: &mut PriceBook,
    cloudwatch: &aws_sdk_cloudwatch::Client,
    region: &str,
    options: &AnalyzeOptions,
) -> InstanceReport {
    let current = prices.hourly_rate(&record.instance_type, region).await;
    if current.is_none() {
        warn!(
            "no price for {} ({}), listing with unknown cost",
            record.id, record.instance_type
        );
        return build_instance_report(
            record,
            None,
            None,
            Vec::new(),
            options.low_cpu_threshold,
            options.high_cpu_threshold,
        );
    }

    // Utilization only matters for running instances, and only when asked for
    let utilization = if options.check_metrics && record.is_running() {
        metrics::cpu_utilization(cloudwatch, &record.id, options.lookback_days).await
    } else {
        None
    };

    let alternatives = recommend::alternatives(
        &record.instance_type,
        utilization.map(|u| u.avg),
        options.low_cpu_threshold,
    );
    let mut priced = Vec::with_capacity(alternatives.len());
    for alt in alternatives {
        let rate = prices.hourly_rate(&alt.instance_type, region).await;
        priced.push((alt, rate));
    }

    build_instance_report(
        record,
        current,
        utilization,
        priced,
        options.low_cpu_threshold,
        options.high_cpu_threshold,
    )
}
