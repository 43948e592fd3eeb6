//! On-demand price resolution
//!
//! Live lookups go through the AWS Price List API (served from us-east-1
//! only); a built-in table of approximate rates covers offline runs and API
//! failures. An unknown price stays unknown (`None`); it is never reported
//! as a free instance, and callers skip unpriced candidates.

use std::collections::HashMap;

use aws_sdk_pricing::types::{Filter as PricingFilter, FilterType};
use tracing::{debug, warn};

use crate::error::{CostctlError, Result};

/// Rough on-demand Linux rates for common types, us-east-1 ballpark.
/// Fallback only; the live lookup is authoritative when available.
pub fn static_price_estimate(instance_type: &str) -> Option<f64> {
    let rate = match instance_type {
        // T3 (Intel)
        "t3.nano" => 0.0052,
        "t3.micro" => 0.0104,
        "t3.small" => 0.0208,
        "t3.medium" => 0.0416,
        "t3.large" => 0.0832,
        "t3.xlarge" => 0.1664,
        "t3.2xlarge" => 0.3328,
        // T3a (AMD, ~10% cheaper)
        "t3a.nano" => 0.0047,
        "t3a.micro" => 0.0094,
        "t3a.small" => 0.0188,
        "t3a.medium" => 0.0376,
        "t3a.large" => 0.0752,
        "t3a.xlarge" => 0.1504,
        "t3a.2xlarge" => 0.3008,
        // T4g (Graviton2, ~20% cheaper)
        "t4g.nano" => 0.0042,
        "t4g.micro" => 0.0084,
        "t4g.small" => 0.0168,
        "t4g.medium" => 0.0336,
        "t4g.large" => 0.0672,
        "t4g.xlarge" => 0.1344,
        "t4g.2xlarge" => 0.2688,
        // M5
        "m5.large" => 0.096,
        "m5.xlarge" => 0.192,
        "m5.2xlarge" => 0.384,
        // M6i (newer generation, same list price as M5)
        "m6i.large" => 0.096,
        "m6i.xlarge" => 0.192,
        "m6i.2xlarge" => 0.384,
        // M6a (AMD)
        "m6a.large" => 0.0864,
        "m6a.xlarge" => 0.1728,
        "m6a.2xlarge" => 0.3456,
        // M7g (Graviton3)
        "m7g.medium" => 0.0408,
        "m7g.large" => 0.0816,
        "m7g.xlarge" => 0.1632,
        _ => return None,
    };
    Some(rate)
}

/// Price List API location name for a region code.
///
/// Unmapped regions pass through unchanged; the query then matches nothing
/// and resolution falls back to the static table.
pub fn pricing_location(region: &str) -> &str {
    match region {
        "us-east-1" => "US East (N. Virginia)",
        "us-east-2" => "US East (Ohio)",
        "us-west-1" => "US West (N. California)",
        "us-west-2" => "US West (Oregon)",
        "eu-west-1" => "EU (Ireland)",
        "eu-central-1" => "EU (Frankfurt)",
        "ap-southeast-1" => "Asia Pacific (Singapore)",
        "ap-northeast-1" => "Asia Pacific (Tokyo)",
        other => other,
    }
}

/// Process-scoped price resolver with a (type, region) cache.
///
/// Negative results are cached too: each (type, region) pair costs at most
/// one network round-trip per run.
pub struct PriceBook {
    client: Option<aws_sdk_pricing::Client>,
    cache: HashMap<(String, String), Option<f64>>,
}

impl PriceBook {
    pub fn new(client: aws_sdk_pricing::Client) -> Self {
        Self {
            client: Some(client),
            cache: HashMap::new(),
        }
    }

    /// Resolver backed by the static table only, for offline runs.
    pub fn offline() -> Self {
        Self {
            client: None,
            cache: HashMap::new(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    /// Hourly on-demand rate for an instance type in a region, or `None`
    /// when neither the live API nor the static table knows it.
    ///
    /// Failures never escape: a failed live lookup degrades to the static
    /// table and is logged at warn level.
    pub async fn hourly_rate(&mut self, instance_type: &str, region: &str) -> Option<f64> {
        let key = (instance_type.to_string(), region.to_string());
        if let Some(cached) = self.cache.get(&key) {
            debug!("price cache hit for {} in {}", instance_type, region);
            return *cached;
        }

        let mut rate = match &self.client {
            Some(client) => match fetch_on_demand_rate(client, instance_type, region).await {
                Ok(Some(r)) => Some(r),
                Ok(None) => {
                    debug!("no price list match for {} in {}", instance_type, region);
                    None
                }
                Err(e) => {
                    warn!("Could not fetch price for {}: {}", instance_type, e);
                    None
                }
            },
            None => None,
        };

        if rate.is_none() {
            rate = static_price_estimate(instance_type);
            if rate.is_some() {
                debug!("using built-in price estimate for {}", instance_type);
            }
        }

        self.cache.insert(key, rate);
        rate
    }
}

async fn fetch_on_demand_rate(
    client: &aws_sdk_pricing::Client,
    instance_type: &str,
    region: &str,
) -> Result<Option<f64>> {
    let location = pricing_location(region);
    let term_filters = [
        ("instanceType", instance_type),
        ("location", location),
        ("operatingSystem", "Linux"),
        ("tenancy", "Shared"),
        ("preInstalledSw", "NA"),
        ("capacitystatus", "Used"),
    ];

    let mut request = client
        .get_products()
        .service_code("AmazonEC2")
        .max_results(1);
    for (field, value) in term_filters {
        let filter = PricingFilter::builder()
            .r#type(FilterType::TermMatch)
            .field(field)
            .value(value)
            .build()
            .map_err(|e| CostctlError::Aws(format!("Invalid pricing filter: {}", e)))?;
        request = request.filters(filter);
    }

    let response = request
        .send()
        .await
        .map_err(|e| CostctlError::Aws(format!("GetProducts failed: {}", e)))?;

    Ok(response
        .price_list()
        .first()
        .and_then(|item| parse_on_demand_rate(item)))
}

/// Walk a price-list item down to `terms.OnDemand.*.priceDimensions.*
/// .pricePerUnit.USD`. Zero or unparsable rates count as no price.
fn parse_on_demand_rate(price_item: &str) -> Option<f64> {
    let item: serde_json::Value = serde_json::from_str(price_item).ok()?;
    let on_demand = item.get("terms")?.get("OnDemand")?.as_object()?;
    let term = on_demand.values().next()?;
    let dimensions = term.get("priceDimensions")?.as_object()?;
    let dimension = dimensions.values().next()?;
    let usd = dimension.get("pricePerUnit")?.get("USD")?.as_str()?;
    let rate: f64 = usd.parse().ok()?;
    if rate > 0.0 {
        Some(rate)
    } else {
        None
    }
}
