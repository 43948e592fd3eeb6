//! Alternative instance-type generation
//!
//! Static domain knowledge: which families have cheaper architecture or
//! newer-generation siblings, and how sizes step down. The tables are fixed
//! at build time; nothing here talks to AWS.

use serde::Serialize;
use std::fmt;

/// Default cutoff: average CPU below this (strict) emits a downsize
/// candidate. Overridable via `[analysis] low_cpu_threshold`.
pub const LOW_CPU_THRESHOLD: f64 = 20.0;
/// Default cutoff: average CPU above this flags the instance in the report.
/// Warning only: upsizing is never suggested, whatever the utilization.
pub const HIGH_CPU_THRESHOLD: f64 = 80.0;

/// Mutually exclusive optimization strategy buckets.
///
/// Fleet savings are aggregated per category and must never be added
/// across categories (migrating to Graviton and migrating to AMD are
/// alternative futures, not cumulative ones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Graviton,
    Amd,
    Intel,
    Downsize,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Graviton,
        Category::Amd,
        Category::Intel,
        Category::Downsize,
    ];

    /// Human-readable strategy name for summary output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Graviton => "Graviton (ARM) migration",
            Category::Amd => "AMD migration",
            Category::Intel => "Intel generation upgrade",
            Category::Downsize => "Downsizing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Graviton => "graviton",
            Category::Amd => "amd",
            Category::Intel => "intel",
            Category::Downsize => "downsize",
        };
        write!(f, "{}", s)
    }
}

/// A proposed replacement instance type, not yet priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub instance_type: String,
    pub rationale: String,
    pub category: Category,
}

/// Split `family.size`, rejecting anything that isn't exactly two non-empty
/// dot-separated parts.
pub fn split_instance_type(instance_type: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = instance_type.split('.').collect();
    match parts.as_slice() {
        [family, size] if !family.is_empty() && !size.is_empty() => Some((family, size)),
        _ => None,
    }
}

/// Architecture/generation upgrades per family, in recommendation order
/// (Graviton before AMD before Intel).
pub fn family_upgrades(family: &str) -> Option<&'static [(&'static str, &'static str, Category)]> {
    let upgrades: &[(&str, &str, Category)] = match family {
        "t3" => &[
            ("t4g", "Graviton2 ARM - 20% cheaper", Category::Graviton),
            ("t3a", "AMD - 10% cheaper", Category::Amd),
        ],
        // t3a is already AMD; only the ARM step remains
        "t3a" => &[("t4g", "Graviton2 ARM - 20% cheaper", Category::Graviton)],
        "t2" => &[
            ("t3", "Newer generation", Category::Intel),
            ("t4g", "Graviton2 ARM - 20% cheaper", Category::Graviton),
        ],
        "m5" => &[
            ("m7g", "Graviton3 - Latest gen", Category::Graviton),
            ("m6a", "AMD - 10% cheaper", Category::Amd),
            ("m6i", "Intel 6th gen", Category::Intel),
        ],
        "m6i" => &[
            ("m7g", "Graviton3 - Better price/perf", Category::Graviton),
            ("m6a", "AMD - 10% cheaper", Category::Amd),
        ],
        "m4" => &[
            ("m7g", "Graviton3 - Latest", Category::Graviton),
            ("m6i", "Intel 6th gen", Category::Intel),
            ("m5", "Intel 5th gen", Category::Intel),
        ],
        "c5" => &[
            ("c7g", "Graviton3 - Best price/perf", Category::Graviton),
            ("c6a", "AMD", Category::Amd),
            ("c6i", "Intel 6th gen", Category::Intel),
        ],
        "c4" => &[
            ("c7g", "Graviton3", Category::Graviton),
            ("c6i", "Intel 6th gen", Category::Intel),
        ],
        "r5" => &[
            ("r7g", "Graviton3", Category::Graviton),
            ("r6a", "AMD", Category::Amd),
            ("r6i", "Intel 6th gen", Category::Intel),
        ],
        "r4" => &[
            ("r7g", "Graviton3", Category::Graviton),
            ("r6i", "Intel 6th gen", Category::Intel),
        ],
        _ => return None,
    };
    Some(upgrades)
}

/// One step down the size ladder.
pub fn smaller_size(size: &str) -> Option<&'static str> {
    match size {
        "4xlarge" => Some("2xlarge"),
        "2xlarge" => Some("xlarge"),
        "xlarge" => Some("large"),
        "large" => Some("medium"),
        "medium" => Some("small"),
        "small" => Some("micro"),
        _ => None,
    }
}

/// ARM-native families: no upgrade mapping exists because they are already
/// on the cheapest architecture tier.
pub fn is_arm_family(family: &str) -> bool {
    matches!(family, "t4g" | "m6g" | "m7g" | "c6g" | "c7g" | "r6g" | "r7g")
}

/// Generate ordered replacement candidates for an instance type.
///
/// Families without a table entry yield nothing, downsize included. The
/// downsize candidate requires observed utilization: `cpu_avg` of `None`
/// (no data) never produces one, regardless of what the average would have
/// been. `low_cpu_threshold` is the configured downsize cutoff
/// ([`LOW_CPU_THRESHOLD`] by default).
pub fn alternatives(
    instance_type: &str,
    cpu_avg: Option<f64>,
    low_cpu_threshold: f64,
) -> Vec<Alternative> {
    let Some((family, size)) = split_instance_type(instance_type) else {
        return Vec::new();
    };
    let Some(upgrades) = family_upgrades(family) else {
        return Vec::new();
    };

    let mut out: Vec<Alternative> = upgrades
        .iter()
        .map(|(target, rationale, category)| Alternative {
            instance_type: format!("{}.{}", target, size),
            rationale: (*rationale).to_string(),
            category: *category,
        })
        .collect();

    if let Some(avg) = cpu_avg {
        if avg < low_cpu_threshold {
            if let Some(smaller) = smaller_size(size) {
                out.push(Alternative {
                    instance_type: format!("{}.{}", family, smaller),
                    rationale: format!("Downsize (low CPU: {:.1}%)", avg),
                    category: Category::Downsize,
                });
            }
        }
    }

    out
}
