//! AWS session bootstrap
//!
//! Resolves profile and region, then proves the credentials work with an
//! STS identity check before any analysis starts. A session that cannot
//! authenticate is a fatal setup error; nothing downstream runs without it.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::error::{CostctlError, Result};

pub struct AwsSession {
    pub config: SdkConfig,
    /// Region the analysis runs against.
    pub region: String,
    pub account: String,
    pub caller_arn: String,
}

/// Build the SDK configuration and verify credentials.
///
/// Region resolution: explicit value (flag or config file), then the SDK
/// default chain (profile config, environment), then us-east-1.
pub async fn establish(profile: Option<&str>, region: Option<&str>) -> Result<AwsSession> {
    let region_provider =
        RegionProviderChain::first_try(region.map(|r| Region::new(r.to_string())))
            .or_default_provider()
            .or_else(Region::new("us-east-1"));

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    if let Some(profile) = profile {
        info!("using AWS profile: {}", profile);
        loader = loader.profile_name(profile);
    }
    let config = loader.load().await;

    let region = config
        .region()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "us-east-1".to_string());

    // Fail fast if the credentials don't work
    let sts = aws_sdk_sts::Client::new(&config);
    let identity = sts.get_caller_identity().send().await.map_err(|e| {
        CostctlError::Credentials(format!("Unable to authenticate with AWS: {}", e))
    })?;

    let account = identity.account().unwrap_or("unknown").to_string();
    let caller_arn = identity.arn().unwrap_or("unknown").to_string();
    info!("authenticated as {} (account {})", caller_arn, account);

    Ok(AwsSession {
        config,
        region,
        account,
        caller_arn,
    })
}

impl AwsSession {
    pub fn ec2_client(&self) -> aws_sdk_ec2::Client {
        aws_sdk_ec2::Client::new(&self.config)
    }

    pub fn cloudwatch_client(&self) -> aws_sdk_cloudwatch::Client {
        aws_sdk_cloudwatch::Client::new(&self.config)
    }

    /// Price List client pinned to us-east-1, the only region serving that API.
    pub fn pricing_client(&self) -> aws_sdk_pricing::Client {
        let pricing_config = self
            .config
            .to_builder()
            .region(Region::new("us-east-1"))
            .build();
        aws_sdk_pricing::Client::new(&pricing_config)
    }
}
