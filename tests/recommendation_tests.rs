//! Integration tests for alternative-type generation
//!
//! Exercises the candidate tables through the public API: architecture
//! swaps, generation upgrades, and the utilization-gated downsize step.

use costctl::recommend::{
    alternatives, family_upgrades, is_arm_family, smaller_size, split_instance_type, Category,
};

#[test]
fn test_every_mapped_family_yields_candidates() {
    let mapped = [
        "t3", "t3a", "t2", "m5", "m6i", "m4", "c5", "c4", "r5", "r4",
    ];
    for family in mapped {
        let upgrades = family_upgrades(family).unwrap();
        assert!(!upgrades.is_empty(), "{} has an empty table entry", family);

        let alts = alternatives(&format!("{}.large", family), None, 20.0);
        assert_eq!(alts.len(), upgrades.len());
        // Architecture swaps preserve the size
        for alt in &alts {
            assert!(alt.instance_type.ends_with(".large"));
            assert_ne!(alt.instance_type, format!("{}.large", family));
        }
    }
}

#[test]
fn test_graviton_offered_by_every_mapped_family() {
    let mapped = [
        "t3", "t3a", "t2", "m5", "m6i", "m4", "c5", "c4", "r5", "r4",
    ];
    for family in mapped {
        let alts = alternatives(&format!("{}.xlarge", family), None, 20.0);
        let has_graviton = alts.iter().any(|a| a.category == Category::Graviton);
        assert!(has_graviton, "{} offers no Graviton candidate", family);
    }
}

#[test]
fn test_compute_memory_families_swap_architecture() {
    let c5 = alternatives("c5.2xlarge", None, 20.0);
    let types: Vec<&str> = c5.iter().map(|a| a.instance_type.as_str()).collect();
    assert_eq!(types, vec!["c7g.2xlarge", "c6a.2xlarge", "c6i.2xlarge"]);

    let r5 = alternatives("r5.large", None, 20.0);
    let types: Vec<&str> = r5.iter().map(|a| a.instance_type.as_str()).collect();
    assert_eq!(types, vec!["r7g.large", "r6a.large", "r6i.large"]);

    let r4 = alternatives("r4.xlarge", None, 20.0);
    assert_eq!(r4.len(), 2);
    assert_eq!(r4[0].category, Category::Graviton);
    assert_eq!(r4[1].category, Category::Intel);
}

#[test]
fn test_downsize_keeps_family_and_steps_once() {
    let alts = alternatives("m6i.4xlarge", Some(8.5), 20.0);
    let downsize: Vec<_> = alts
        .iter()
        .filter(|a| a.category == Category::Downsize)
        .collect();
    assert_eq!(downsize.len(), 1);
    // One ladder step, same family
    assert_eq!(downsize[0].instance_type, "m6i.2xlarge");
    assert_eq!(downsize[0].rationale, "Downsize (low CPU: 8.5%)");
}

#[test]
fn test_unladdered_sizes_still_get_architecture_swaps() {
    // No downsize step exists for metal, but the family swaps apply
    assert_eq!(smaller_size("metal"), None);
    let alts = alternatives("t3.metal", Some(5.0), 20.0);
    assert!(!alts.is_empty());
    assert!(alts.iter().all(|a| a.category != Category::Downsize));
    assert!(alts.iter().any(|a| a.instance_type == "t4g.metal"));
}

#[test]
fn test_arm_native_fleet_is_left_alone() {
    for family in ["t4g", "m7g", "c7g", "r7g"] {
        assert!(is_arm_family(family));
        assert!(alternatives(&format!("{}.large", family), Some(2.0), 20.0).is_empty());
    }
}

#[test]
fn test_malformed_types_yield_nothing() {
    assert_eq!(split_instance_type("t3large"), None);
    assert!(alternatives("t3large", Some(1.0), 20.0).is_empty());
    assert!(alternatives("t3.large.extra", Some(1.0), 20.0).is_empty());
    assert!(alternatives("", None, 20.0).is_empty());
}
