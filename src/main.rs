use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use costctl::analyzer::{self, AnalyzeOptions};
use costctl::config::{self, Config};
use costctl::error::CostctlError;
use costctl::exit_codes;
use costctl::output;
use costctl::pricing::PriceBook;
use costctl::recommend;
use costctl::savings;
use costctl::session;

#[derive(Parser)]
#[command(name = "costctl")]
#[command(
    about = "EC2 cost optimization advisor",
    long_about = "costctl is a read-only advisor for EC2 compute spend.\n\nIt inventories the instances in a region, resolves on-demand pricing,\nsamples CPU utilization from CloudWatch, and recommends cheaper\nalternatives:\n  - Graviton (ARM) equivalents\n  - AMD equivalents\n  - Newer-generation Intel\n  - Smaller sizes when utilization is low\n\ncostctl never modifies instances; it only describes and reports."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze EC2 instances and recommend cheaper alternatives
    ///
    /// Discovers all non-terminated instances in the region, resolves their
    /// on-demand prices, optionally samples CPU utilization, and prints
    /// per-instance recommendations plus a fleet summary.
    ///
    /// Examples:
    ///   costctl analyze
    ///   costctl analyze --region eu-west-1 --profile prod
    ///   costctl analyze --no-metrics --offline
    ///   costctl analyze --output json > report.json
    ///   costctl analyze --export savings.csv
    Analyze {
        /// AWS credentials profile
        #[arg(long, env = "AWS_PROFILE")]
        profile: Option<String>,
        /// AWS region (defaults to config file, then the SDK chain)
        #[arg(short, long)]
        region: Option<String>,
        /// Skip CloudWatch utilization sampling (disables downsize checks)
        #[arg(long)]
        no_metrics: bool,
        /// Use built-in price estimates instead of the Price List API
        #[arg(long)]
        offline: bool,
        /// Export per-candidate rows to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Look up the on-demand price of one instance type
    ///
    /// Examples:
    ///   costctl price t3.large
    ///   costctl price m5.xlarge --region eu-central-1
    ///   costctl price t4g.medium --offline
    Price {
        /// Instance type, e.g. t3.large
        instance_type: String,
        /// AWS credentials profile
        #[arg(long, env = "AWS_PROFILE")]
        profile: Option<String>,
        /// AWS region to price for
        #[arg(short, long)]
        region: Option<String>,
        /// Use built-in price estimates instead of the Price List API
        #[arg(long)]
        offline: bool,
    },
    /// Create a starter configuration file
    ///
    /// Examples:
    ///   costctl init
    ///   costctl init --output ~/.config/costctl/config.toml --force
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costctl.toml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Suppress info by default; -v enables debug
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", style("ERROR:").red().bold(), err);
        let code = err
            .downcast_ref::<CostctlError>()
            .map(exit_codes::exit_code_for_error)
            .unwrap_or(exit_codes::codes::SYSTEM_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            profile,
            region,
            no_metrics,
            offline,
            export,
        } => {
            analyze_command(
                &config,
                profile.as_deref().or_else(|| config.profile()),
                region.as_deref().or_else(|| config.region()),
                no_metrics,
                offline || config.analysis.offline,
                export.as_deref(),
                &cli.output,
            )
            .await?;
        }
        Commands::Price {
            instance_type,
            profile,
            region,
            offline,
        } => {
            price_command(
                &instance_type,
                profile.as_deref().or_else(|| config.profile()),
                region.as_deref().or_else(|| config.region()),
                offline || config.analysis.offline,
                &cli.output,
            )
            .await?;
        }
        Commands::Init { output, force } => {
            config::init_config(&output, force)?;
        }
    }

    Ok(())
}

async fn analyze_command(
    config: &Config,
    profile: Option<&str>,
    region: Option<&str>,
    no_metrics: bool,
    offline: bool,
    export: Option<&Path>,
    output: &str,
) -> Result<()> {
    let session = session::establish(profile, region).await?;

    if output != "json" {
        println!("Authenticated as: {}", session.caller_arn);
        println!(
            "Analyzing EC2 instances in {}...",
            style(&session.region).cyan()
        );
        println!();
    }

    let options = AnalyzeOptions {
        check_metrics: !no_metrics,
        offline,
        lookback_days: config.analysis.lookback_days,
        low_cpu_threshold: config.analysis.low_cpu_threshold,
        high_cpu_threshold: config.analysis.high_cpu_threshold,
    };
    let report = analyzer::analyze_fleet(&session, &options).await?;

    if output == "json" {
        output::print_json_report(&report)?;
    } else {
        output::print_text_report(&report);
    }

    if let Some(path) = export {
        output::export_csv(&report, path)?;
    }

    Ok(())
}

async fn price_command(
    instance_type: &str,
    profile: Option<&str>,
    region: Option<&str>,
    offline: bool,
    output: &str,
) -> Result<()> {
    if recommend::split_instance_type(instance_type).is_none() {
        return Err(CostctlError::Validation {
            field: "instance-type".to_string(),
            reason: format!("'{}' is not of the form <family>.<size>", instance_type),
        }
        .into());
    }

    let (mut prices, region) = if offline {
        (
            PriceBook::offline(),
            region.unwrap_or("us-east-1").to_string(),
        )
    } else {
        let session = session::establish(profile, region).await?;
        (
            PriceBook::new(session.pricing_client()),
            session.region.clone(),
        )
    };

    let rate = prices.hourly_rate(instance_type, &region).await;

    if output == "json" {
        let payload = serde_json::json!({
            "instance_type": instance_type,
            "region": region,
            "hourly": rate,
            "monthly": rate.map(savings::monthly_cost),
            "source": if prices.is_offline() { "built-in" } else { "price-list-api" },
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match rate {
        Some(hourly) => {
            println!(
                "{}: ${:.4}/hour (${:.2}/month) in {}",
                style(instance_type).cyan(),
                hourly,
                savings::monthly_cost(hourly),
                region
            );
        }
        None => {
            println!(
                "No on-demand price found for {} in {}",
                instance_type, region
            );
        }
    }

    Ok(())
}
