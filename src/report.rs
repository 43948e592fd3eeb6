//! Advisory report model and fleet aggregation
//!
//! Everything here is plain data and pure folds; the AWS-facing driver
//! lives in `analyzer`. The aggregation rule that matters: category totals
//! take the single best candidate per category per instance (a max-reduce),
//! and categories are alternative strategies whose totals must never be
//! added together.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discovery::InstanceRecord;
use crate::metrics::CpuStats;
use crate::recommend::{self, Alternative, Category};
use crate::savings::{self, Savings};

/// Why an instance does or does not carry an open recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// At least one alternative was generated.
    Advised,
    /// ARM-native family; no cheaper architecture tier exists.
    AlreadyOptimized,
    /// Family outside the advisory tables.
    Unsupported,
    /// Current price unresolvable; no baseline to compare against.
    UnknownPrice,
}

/// A proposed replacement with resolved pricing and computed savings.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub instance_type: String,
    pub category: Category,
    pub rationale: String,
    pub hourly_rate: f64,
    pub monthly_cost: f64,
    pub savings: Savings,
}

/// One instance's slice of the report.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub id: String,
    pub name: Option<String>,
    pub state: String,
    pub instance_type: String,
    /// None when the price could not be resolved anywhere.
    pub hourly_cost: Option<f64>,
    pub monthly_cost: Option<f64>,
    /// None when metrics were skipped, unavailable, or the instance is not
    /// running.
    pub utilization: Option<CpuStats>,
    /// Average CPU below the configured downsize cutoff.
    pub low_utilization: bool,
    /// Average CPU above the configured warning cutoff. Never produces a
    /// candidate, only a flag.
    pub high_utilization: bool,
    pub status: InstanceStatus,
    /// Priced candidates in generation order. Candidates whose price could
    /// not be resolved are absent (unknown is not $0).
    pub candidates: Vec<Candidate>,
}

impl InstanceReport {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    /// Best positive monthly savings per category for this instance.
    ///
    /// A max-reduce: two candidates in the same category collapse to the
    /// better one, and candidates that save nothing contribute nothing.
    pub fn best_by_category(&self) -> BTreeMap<Category, f64> {
        let mut best: BTreeMap<Category, f64> = BTreeMap::new();
        for candidate in &self.candidates {
            let monthly = candidate.savings.per_month;
            if monthly <= 0.0 {
                continue;
            }
            let entry = best.entry(candidate.category).or_insert(0.0);
            if monthly > *entry {
                *entry = monthly;
            }
        }
        best
    }
}

/// Assemble one instance's report from resolved inputs.
///
/// `priced_alternatives` pairs every generated alternative with its
/// resolved hourly rate (or `None`). Order is preserved; unpriced
/// candidates are dropped rather than treated as free.
pub fn build_instance_report(
    record: &InstanceRecord,
    current_hourly: Option<f64>,
    utilization: Option<CpuStats>,
    priced_alternatives: Vec<(Alternative, Option<f64>)>,
    low_cpu_threshold: f64,
    high_cpu_threshold: f64,
) -> InstanceReport {
    let status = if current_hourly.is_none() {
        InstanceStatus::UnknownPrice
    } else if priced_alternatives.is_empty() {
        match recommend::split_instance_type(&record.instance_type) {
            Some((family, _)) if recommend::is_arm_family(family) => {
                InstanceStatus::AlreadyOptimized
            }
            _ => InstanceStatus::Unsupported,
        }
    } else {
        InstanceStatus::Advised
    };

    let candidates = match current_hourly {
        Some(current) => priced_alternatives
            .into_iter()
            .filter_map(|(alt, rate)| {
                let rate = rate?;
                Some(Candidate {
                    instance_type: alt.instance_type,
                    category: alt.category,
                    rationale: alt.rationale,
                    hourly_rate: rate,
                    monthly_cost: savings::monthly_cost(rate),
                    savings: savings::evaluate(current, rate),
                })
            })
            .collect(),
        None => Vec::new(),
    };

    InstanceReport {
        id: record.id.clone(),
        name: record.name.clone(),
        state: record.state.clone(),
        instance_type: record.instance_type.clone(),
        hourly_cost: current_hourly,
        monthly_cost: current_hourly.map(savings::monthly_cost),
        utilization,
        low_utilization: matches!(utilization, Some(u) if u.avg < low_cpu_threshold),
        high_utilization: matches!(utilization, Some(u) if u.avg > high_cpu_threshold),
        status,
        candidates,
    }
}

/// The largest single category total. Categories are mutually exclusive
/// strategies; this is a max, never a sum.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MaxPotential {
    pub category: Category,
    pub monthly_savings: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FleetSummary {
    pub instances_discovered: usize,
    /// Instances with an open recommendation; only these feed the baseline.
    pub instances_analyzed: usize,
    pub instances_already_optimized: usize,
    pub instances_unsupported: usize,
    pub instances_unknown_price: usize,
    /// Monthly cost of the analyzed instances at their current types.
    pub baseline_monthly_cost: f64,
    pub category_totals: BTreeMap<Category, f64>,
    pub max_potential: Option<MaxPotential>,
}

impl FleetSummary {
    /// Fold one instance into the running totals.
    pub fn accumulate(&mut self, report: &InstanceReport) {
        self.instances_discovered += 1;
        match report.status {
            InstanceStatus::UnknownPrice => {
                self.instances_unknown_price += 1;
                return;
            }
            InstanceStatus::AlreadyOptimized => {
                self.instances_already_optimized += 1;
                return;
            }
            InstanceStatus::Unsupported => {
                self.instances_unsupported += 1;
                return;
            }
            InstanceStatus::Advised => {}
        }

        self.instances_analyzed += 1;
        if let Some(monthly) = report.monthly_cost {
            self.baseline_monthly_cost += monthly;
        }
        for (category, best) in report.best_by_category() {
            *self.category_totals.entry(category).or_insert(0.0) += best;
        }
        self.max_potential = self.compute_max_potential();
    }

    /// Projected monthly cost if the whole fleet adopted one category's
    /// recommendations.
    pub fn new_monthly_cost(&self, category: Category) -> Option<f64> {
        let total = self.category_totals.get(&category)?;
        Some(self.baseline_monthly_cost - total)
    }

    fn compute_max_potential(&self) -> Option<MaxPotential> {
        self.category_totals
            .iter()
            .filter(|(_, total)| **total > 0.0)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(category, total)| MaxPotential {
                category: *category,
                monthly_savings: *total,
            })
    }
}

/// The full advisory report: a data structure, rendered elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub region: String,
    pub metrics_enabled: bool,
    /// True when prices came from the built-in table only.
    pub offline: bool,
    pub generated_at: DateTime<Utc>,
    pub instances: Vec<InstanceReport>,
    pub summary: FleetSummary,
}

impl FleetReport {
    pub fn assemble(
        region: String,
        metrics_enabled: bool,
        offline: bool,
        instances: Vec<InstanceReport>,
    ) -> Self {
        let mut summary = FleetSummary::default();
        for instance in &instances {
            summary.accumulate(instance);
        }
        Self {
            region,
            metrics_enabled,
            offline,
            generated_at: Utc::now(),
            instances,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::alternatives;

    fn record(id: &str, itype: &str, state: &str) -> InstanceRecord {
        InstanceRecord {
            id: id.to_string(),
            name: None,
            state: state.to_string(),
            instance_type: itype.to_string(),
        }
    }

    fn priced(itype: &str, cpu_avg: Option<f64>, price_of: impl Fn(&str) -> Option<f64>) -> Vec<(Alternative, Option<f64>)> {
        alternatives(itype, cpu_avg, 20.0)
            .into_iter()
            .map(|alt| {
                let rate = price_of(&alt.instance_type);
                (alt, rate)
            })
            .collect()
    }

    fn build(
        rec: &InstanceRecord,
        current: Option<f64>,
        cpu: Option<CpuStats>,
        priced: Vec<(Alternative, Option<f64>)>,
    ) -> InstanceReport {
        build_instance_report(rec, current, cpu, priced, 20.0, 80.0)
    }

    #[test]
    fn test_unknown_price_excluded_from_totals() {
        let rec = record("i-1", "t3.large", "running");
        let report = build(&rec, None, None, Vec::new());
        assert_eq!(report.status, InstanceStatus::UnknownPrice);
        assert!(report.candidates.is_empty());
        assert_eq!(report.monthly_cost, None);

        let mut summary = FleetSummary::default();
        summary.accumulate(&report);
        assert_eq!(summary.instances_discovered, 1);
        assert_eq!(summary.instances_unknown_price, 1);
        assert_eq!(summary.instances_analyzed, 0);
        assert_eq!(summary.baseline_monthly_cost, 0.0);
        assert!(summary.category_totals.is_empty());
        assert!(summary.max_potential.is_none());
    }

    #[test]
    fn test_already_optimized_reported_but_not_counted() {
        let rec = record("i-2", "t4g.nano", "running");
        let report = build(&rec, Some(0.0042), None, Vec::new());
        assert_eq!(report.status, InstanceStatus::AlreadyOptimized);

        let mut summary = FleetSummary::default();
        summary.accumulate(&report);
        assert_eq!(summary.instances_already_optimized, 1);
        assert_eq!(summary.instances_analyzed, 0);
        assert_eq!(summary.baseline_monthly_cost, 0.0);
    }

    #[test]
    fn test_unmapped_family_is_unsupported() {
        let rec = record("i-3", "g4dn.xlarge", "running");
        let report = build(&rec, Some(0.526), None, Vec::new());
        assert_eq!(report.status, InstanceStatus::Unsupported);

        let mut summary = FleetSummary::default();
        summary.accumulate(&report);
        assert_eq!(summary.instances_unsupported, 1);
        assert_eq!(summary.baseline_monthly_cost, 0.0);
    }

    #[test]
    fn test_unpriced_candidates_are_dropped_not_free() {
        let rec = record("i-4", "t3.large", "running");
        // Graviton candidate priced, AMD candidate unknown
        let report = build(
            &rec,
            Some(0.0832),
            None,
            priced("t3.large", None, |t| (t == "t4g.large").then_some(0.0672)),
        );
        assert_eq!(report.status, InstanceStatus::Advised);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].instance_type, "t4g.large");
    }

    #[test]
    fn test_negative_savings_reported_but_not_totaled() {
        let rec = record("i-5", "t3.large", "running");
        // Candidate costs more than current
        let report = build(
            &rec,
            Some(0.05),
            None,
            priced("t3.large", None, |_| Some(0.08)),
        );
        assert_eq!(report.candidates.len(), 2);
        assert!(report.candidates.iter().all(|c| c.savings.per_month < 0.0));
        assert!(report.best_by_category().is_empty());

        let mut summary = FleetSummary::default();
        summary.accumulate(&report);
        // Counted as analyzed, baseline accrues, but no savings totals
        assert_eq!(summary.instances_analyzed, 1);
        assert!((summary.baseline_monthly_cost - 0.05 * 730.0).abs() < 1e-9);
        assert!(summary.category_totals.is_empty());
        assert!(summary.max_potential.is_none());
    }

    #[test]
    fn test_same_category_candidates_never_double_count() {
        let rec = record("i-6", "m4.large", "running");
        // m4 yields two Intel candidates (m6i and m5); both priced cheaper
        let report = build(
            &rec,
            Some(0.10),
            None,
            priced("m4.large", None, |t| match t {
                "m6i.large" => Some(0.096),
                "m5.large" => Some(0.098),
                "m7g.large" => None,
                _ => None,
            }),
        );
        let best = report.best_by_category();
        // Only the better Intel candidate contributes
        let intel = best.get(&Category::Intel).copied().unwrap();
        assert!((intel - (0.10 - 0.096) * 730.0).abs() < 1e-9);
        assert_eq!(best.len(), 1);

        // Feeding only the best candidate yields the same totals
        let solo = build(
            &rec,
            Some(0.10),
            None,
            priced("m4.large", None, |t| (t == "m6i.large").then_some(0.096)),
        );
        let mut both_summary = FleetSummary::default();
        both_summary.accumulate(&report);
        let mut solo_summary = FleetSummary::default();
        solo_summary.accumulate(&solo);
        assert_eq!(
            both_summary.category_totals.get(&Category::Intel),
            solo_summary.category_totals.get(&Category::Intel)
        );
    }

    #[test]
    fn test_max_potential_is_largest_category_not_a_sum() {
        let rec = record("i-7", "t3.large", "running");
        let report = build(
            &rec,
            Some(0.0832),
            Some(CpuStats { avg: 15.2, max: 45.0 }),
            priced("t3.large", Some(15.2), |t| match t {
                "t4g.large" => Some(0.0672),
                "t3a.large" => Some(0.0752),
                "t3.medium" => Some(0.0416),
                _ => None,
            }),
        );
        let mut summary = FleetSummary::default();
        summary.accumulate(&report);

        let max = summary.max_potential.unwrap();
        assert_eq!(max.category, Category::Downsize);
        assert!((max.monthly_savings - 30.368).abs() < 0.01);

        // The categories stay separate
        let graviton = summary.category_totals.get(&Category::Graviton).unwrap();
        let amd = summary.category_totals.get(&Category::Amd).unwrap();
        assert!((graviton - 11.68).abs() < 0.01);
        assert!((amd - 5.84).abs() < 0.01);
        assert!(max.monthly_savings < graviton + amd + max.monthly_savings);
    }

    #[test]
    fn test_new_monthly_cost_per_category() {
        let rec = record("i-8", "t3.large", "running");
        let report = build(
            &rec,
            Some(0.0832),
            None,
            priced("t3.large", None, |t| match t {
                "t4g.large" => Some(0.0672),
                "t3a.large" => Some(0.0752),
                _ => None,
            }),
        );
        let mut summary = FleetSummary::default();
        summary.accumulate(&report);

        let baseline = summary.baseline_monthly_cost;
        let new_cost = summary.new_monthly_cost(Category::Graviton).unwrap();
        assert!((baseline - 0.0832 * 730.0).abs() < 1e-9);
        assert!((new_cost - 0.0672 * 730.0).abs() < 0.01);
        assert!(summary.new_monthly_cost(Category::Downsize).is_none());
    }

    #[test]
    fn test_report_assembly_orders_and_counts() {
        let advised = build(
            &record("i-a", "t3.large", "running"),
            Some(0.0832),
            None,
            priced("t3.large", None, |t| {
                (t == "t4g.large").then_some(0.0672)
            }),
        );
        let optimized = build(
            &record("i-b", "t4g.nano", "running"),
            Some(0.0042),
            None,
            Vec::new(),
        );
        let unknown = build(
            &record("i-c", "x9.mega", "stopped"),
            None,
            None,
            Vec::new(),
        );

        let report = FleetReport::assemble(
            "us-east-1".to_string(),
            true,
            false,
            vec![advised, optimized, unknown],
        );
        assert_eq!(report.instances.len(), 3);
        assert_eq!(report.summary.instances_discovered, 3);
        assert_eq!(report.summary.instances_analyzed, 1);
        assert_eq!(report.summary.instances_already_optimized, 1);
        assert_eq!(report.summary.instances_unknown_price, 1);
        // Discovery order preserved
        assert_eq!(report.instances[0].id, "i-a");
        assert_eq!(report.instances[2].id, "i-c");
    }

    #[test]
    fn test_utilization_flags() {
        let rec = record("i-9", "t3.large", "running");
        let low = build(
            &rec,
            Some(0.0832),
            Some(CpuStats { avg: 12.0, max: 30.0 }),
            Vec::new(),
        );
        assert!(low.low_utilization);
        assert!(!low.high_utilization);

        let high = build(
            &rec,
            Some(0.0832),
            Some(CpuStats { avg: 91.0, max: 99.0 }),
            Vec::new(),
        );
        assert!(high.high_utilization);

        let none = build(&rec, Some(0.0832), None, Vec::new());
        assert!(!none.low_utilization);
        assert!(!none.high_utilization);
    }
}
