//! Report rendering
//!
//! `FleetReport` is data; this module turns it into terminal text, JSON,
//! or a CSV export. Nothing here computes savings; presentation only.

use std::path::Path;

use comfy_table::{Cell, Table};
use console::style;

use crate::recommend::Category;
use crate::report::{FleetReport, InstanceReport, InstanceStatus};
use crate::savings::PriceDirection;

/// Render the full advisory report as terminal text.
pub fn print_text_report(report: &FleetReport) {
    println!("{}", "=".repeat(80));
    println!("EC2 COST OPTIMIZATION RECOMMENDATIONS");
    println!("{}", "=".repeat(80));
    println!("Region: {}", report.region);
    println!(
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Metrics analysis: {}",
        if report.metrics_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "Pricing source: {}",
        if report.offline {
            "built-in estimates"
        } else {
            "AWS Price List API (with built-in fallback)"
        }
    );
    println!();

    for instance in &report.instances {
        print_instance(instance);
        println!("{}", "-".repeat(80));
        println!();
    }

    print_summary(report);
}

fn print_instance(instance: &InstanceReport) {
    println!("Instance: {}", style(instance.display_name()).bold());
    println!("  ID: {}", instance.id);
    println!("  State: {}", instance.state);
    println!("  Type: {}", style(&instance.instance_type).cyan());

    match (instance.hourly_cost, instance.monthly_cost) {
        (Some(hourly), Some(monthly)) => {
            println!("  Cost: ${:.4}/hour (${:.2}/month)", hourly, monthly);
        }
        _ => {
            println!(
                "  Cost: unknown - no pricing available for {}",
                instance.instance_type
            );
        }
    }

    if let Some(cpu) = &instance.utilization {
        println!(
            "  CPU Utilization: Avg {:.1}%, Max {:.1}%",
            cpu.avg, cpu.max
        );
        if instance.low_utilization {
            println!(
                "  {} Low utilization - consider downsizing",
                style("NOTE:").yellow()
            );
        } else if instance.high_utilization {
            println!(
                "  {} High utilization - verify capacity before changing",
                style("WARNING:").red().bold()
            );
        }
    }

    match instance.status {
        InstanceStatus::Advised => {
            println!();
            println!("  Recommendations:");
            if instance.candidates.is_empty() {
                println!("    (no pricing available for the alternatives)");
            }
            for candidate in &instance.candidates {
                print_candidate(candidate);
            }
        }
        InstanceStatus::AlreadyOptimized => {
            println!(
                "  {} already on the most cost-effective architecture",
                style("Status:").dim()
            );
        }
        InstanceStatus::Unsupported => {
            println!(
                "  {} no recommendations for this instance family",
                style("Status:").dim()
            );
        }
        InstanceStatus::UnknownPrice => {
            println!(
                "  {} skipped from totals (price unknown)",
                style("Status:").dim()
            );
        }
    }
}

fn print_candidate(candidate: &crate::report::Candidate) {
    println!(
        "    {} ({})",
        style(&candidate.instance_type).bold(),
        candidate.rationale
    );
    match candidate.savings.direction() {
        PriceDirection::Cheaper => {
            println!(
                "      ${:.4}/hr (${:.2}/mo) - Save {} ({:.1}%)",
                candidate.hourly_rate,
                candidate.monthly_cost,
                style(format!("${:.2}/mo", candidate.savings.per_month)).green(),
                candidate.savings.percent
            );
        }
        PriceDirection::MoreExpensive => {
            println!(
                "      ${:.4}/hr (${:.2}/mo) - {:.1}% more expensive",
                candidate.hourly_rate,
                candidate.monthly_cost,
                candidate.savings.percent.abs()
            );
        }
        PriceDirection::Equal => {
            println!("      ${:.4}/hr - similar pricing", candidate.hourly_rate);
        }
    }
}

fn print_summary(report: &FleetReport) {
    let summary = &report.summary;

    println!("{}", "=".repeat(80));
    println!("SUMMARY");
    println!("{}", "=".repeat(80));
    println!(
        "Instances discovered: {} ({} already optimized, {} unsupported, {} unknown pricing)",
        summary.instances_discovered,
        summary.instances_already_optimized,
        summary.instances_unsupported,
        summary.instances_unknown_price
    );
    println!("Instances analyzed: {}", summary.instances_analyzed);

    if summary.instances_analyzed == 0 {
        println!();
        println!("No optimization recommendations available.");
        return;
    }

    println!(
        "Current monthly cost: ${:.2}",
        summary.baseline_monthly_cost
    );
    println!();

    let mut rows = Vec::new();
    for category in Category::ALL {
        if let Some(total) = summary.category_totals.get(&category) {
            if *total <= 0.0 {
                continue;
            }
            let pct = if summary.baseline_monthly_cost > 0.0 {
                total / summary.baseline_monthly_cost * 100.0
            } else {
                0.0
            };
            let new_cost = summary
                .new_monthly_cost(category)
                .unwrap_or(summary.baseline_monthly_cost);
            rows.push((category, *total, pct, new_cost));
        }
    }

    if !rows.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Strategy", "Savings/mo", "% of cost", "New cost/mo"]);
        for (category, total, pct, new_cost) in rows {
            table.add_row(vec![
                Cell::new(category.label()),
                Cell::new(format!("${:.2}", total)).fg(comfy_table::Color::Green),
                Cell::new(format!("{:.1}%", pct)),
                Cell::new(format!("${:.2}", new_cost)),
            ]);
        }
        println!("{}", table);
        println!();
    }

    if let Some(max) = &summary.max_potential {
        let pct = if summary.baseline_monthly_cost > 0.0 {
            max.monthly_savings / summary.baseline_monthly_cost * 100.0
        } else {
            0.0
        };
        println!(
            "Maximum potential savings: {} ({:.1}%) via {}",
            style(format!("${:.2}/mo", max.monthly_savings)).green().bold(),
            pct,
            max.category.label()
        );
        println!("Strategies are alternatives - their savings do not add up.");
        println!();
    }

    println!("Notes:");
    if report.offline {
        println!("  - Prices are built-in estimates; rerun without --offline for live rates");
    } else {
        println!("  - Prices are real-time from the AWS Price List API");
    }
    println!("  - Graviton (ARM) requires ARM-compatible software/containers");
    println!("  - Test thoroughly in non-production before migrating");
    println!("  - Consider Reserved Instances or Savings Plans for further discounts");
}

/// Render the report as pretty JSON.
pub fn print_json_report(report: &FleetReport) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Write per-candidate rows to a CSV file.
pub fn export_csv(report: &FleetReport, path: &Path) -> crate::error::Result<()> {
    let csv = generate_csv(report);
    std::fs::write(path, csv)?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn generate_csv(report: &FleetReport) -> String {
    let mut csv = String::from(
        "Instance ID,Name,State,Type,Cost/hr,Candidate,Category,Candidate/hr,Savings/mo,Savings %\n",
    );

    for instance in &report.instances {
        let Some(hourly) = instance.hourly_cost else {
            continue;
        };
        for candidate in &instance.candidates {
            csv.push_str(&format!(
                "{},{},{},{},{:.4},{},{},{:.4},{:.2},{:.1}\n",
                instance.id,
                instance.display_name(),
                instance.state,
                instance.instance_type,
                hourly,
                candidate.instance_type,
                candidate.category,
                candidate.hourly_rate,
                candidate.savings.per_month,
                candidate.savings.percent
            ));
        }
    }

    csv
}
