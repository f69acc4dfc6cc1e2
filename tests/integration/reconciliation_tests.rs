//! Species reconciliation over a three-species catalog.

use std::sync::Arc;

use aquacore::interval::Interval;
use aquacore::snapshot::MetricSnapshot;
use aquacore::species::{Metric, Severity, TankProfile};

use crate::mock_hw::catalog;

fn iv(min: f64, max: f64) -> Interval {
    Interval::new(min, max).unwrap()
}

#[test]
fn community_tank_merges_and_flags_temperature() {
    let c = Arc::new(catalog());
    let p = TankProfile::compute(&c, &["goldfish", "betta", "neon"]);

    assert_eq!(p.selected, ["goldfish", "betta", "neon"]);
    // Single shared point is still agreement.
    assert_eq!(p.merged(Metric::Ph), Some(&iv(7.0, 7.0)));
    assert_eq!(p.merged(Metric::Tds), Some(&iv(150.0, 150.0)));
    // Neon has no DO range and does not constrain it.
    assert_eq!(p.merged(Metric::Do), Some(&iv(6.0, 30.0)));
    assert_eq!(p.merged(Metric::Ntu), Some(&iv(0.0, 5.0)));
    assert_eq!(p.merged(Metric::Temp), None);

    assert_eq!(p.conflicts.len(), 1);
    let conflict = &p.conflicts[0];
    assert_eq!(conflict.metric, Metric::Temp);
    assert_eq!(conflict.species, ["Goldfish", "Betta", "Neon Tetra"]);
    assert_eq!(conflict.ranges[1], iv(24.0, 28.0));

    assert_eq!(p.recommendations.len(), 1);
    let rec = &p.recommendations[0];
    assert_eq!(rec.suggested_range, iv(22.0, 26.0));
    assert_eq!(
        rec.reasoning,
        "Compromise range based on median of 3 species requirements"
    );

    assert_eq!(p.critical_hull.get(&Metric::Ph), Some(&iv(5.5, 8.8)));
    assert_eq!(p.critical_hull.get(&Metric::Temp), Some(&iv(15.0, 30.0)));
}

#[test]
fn calibration_presets_average_over_selection() {
    let c = Arc::new(catalog());
    let p = TankProfile::compute(&c, &["goldfish", "betta"]);
    let cal = p.calibration_presets;
    assert!(cal.ph_offset.abs() < 1e-9);
    assert!(cal.temp_offset.abs() < 1e-9);
    assert!((cal.do_calibration - 0.95).abs() < 1e-9);
}

#[test]
fn empty_and_unknown_selections() {
    let c = Arc::new(catalog());
    let p = TankProfile::compute(&c, &["shark", "whale"]);
    assert!(p.is_empty());
    assert!(!p.has_conflicts());
    assert!(p.merged_ranges.values().all(Option::is_none));
    assert_eq!(p.calibration_presets.do_calibration, 1.0);
    assert_eq!(p.severity(Some(100.0), Metric::Ph, None), Severity::Ok);
}

#[test]
fn recomputation_is_stable() {
    let c = Arc::new(catalog());
    let a = TankProfile::compute(&c, &["betta", "goldfish", "betta"]);
    let b = TankProfile::compute(&c, &["betta", "goldfish"]);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn severity_merged_and_per_species() {
    let c = Arc::new(catalog());
    let p = TankProfile::compute(&c, &["goldfish", "betta"]);

    // Merged pH [7.0, 7.5], critical hull [6.0, 8.8].
    assert_eq!(p.severity(Some(7.2), Metric::Ph, None), Severity::Ok);
    assert_eq!(p.severity(Some(7.9), Metric::Ph, None), Severity::Warning);
    assert_eq!(p.severity(Some(9.0), Metric::Ph, None), Severity::Critical);
    assert_eq!(p.severity(Some(0.0), Metric::Ph, None), Severity::Critical);
    assert_eq!(p.severity(None, Metric::Ph, None), Severity::Ok);

    // Conflicted metric has nothing to judge against.
    assert_eq!(p.severity(Some(40.0), Metric::Temp, None), Severity::Ok);

    assert_eq!(p.severity(Some(7.9), Metric::Ph, Some("betta")), Severity::Warning);
    assert_eq!(p.severity(Some(8.1), Metric::Ph, Some("betta")), Severity::Critical);
    // Not selected, still in the catalog.
    assert_eq!(p.severity(Some(7.3), Metric::Ph, Some("neon")), Severity::Warning);
    assert_eq!(p.severity(Some(8.1), Metric::Ph, Some("shark")), Severity::Ok);
}

#[test]
fn warnings_follow_selection_then_metric_order() {
    let c = Arc::new(catalog());
    let p = TankProfile::compute(&c, &["goldfish", "betta"]);
    let snap = MetricSnapshot::new(0).with("ph", 7.9).with("waterTemp", 21.0);

    let warnings = p.warnings(&snap);
    let ids: Vec<&str> = warnings.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, ["betta-ph-warning", "betta-temp-critical"]);

    let temp = &warnings[1];
    assert_eq!(temp.species_name, "Betta");
    assert_eq!(temp.message, "Temperature 21.0°C is too low");
    assert_eq!(temp.recommended_action, "Increase heater or reduce cooling");
}
