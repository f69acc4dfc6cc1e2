//! Merging a species selection into one tank profile.
//!
//! Per metric, independently:
//!
//! 1. Gather the interval of every selected species that constrains the
//!    metric (species without it are left out of that metric only).
//! 2. Intersect.  An empty intersection is a [`Conflict`], answered with a
//!    [`Recommendation`] of `[median(mins), median(maxs)]`.
//! 3. Hull the selected species' critical ranges for merged severity.
//!
//! The computation is a pure function of catalog and selection: repeated
//! calls with the same inputs give identical profiles.  A profile keeps the
//! catalog it was computed from, so later severity and warning queries
//! cannot be judged against a different one.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use super::severity::{Severity, classify};
use super::{CalibrationPresets, Metric, SpeciesCatalog, SpeciesProfile};
use crate::interval::{Interval, hull, intersect, mean, median};

/// Metric → agreed range, or `None` (conflict, or no species constrains it).
pub type MergedRanges = BTreeMap<Metric, Option<Interval>>;

/// A metric on which the selected species share no common range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub metric: Metric,
    /// Names of the species involved, in selection order.
    pub species: Vec<String>,
    /// Their ranges, index-aligned with `species`.
    pub ranges: Vec<Interval>,
}

/// A compromise range proposed for a conflicted metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub metric: Metric,
    pub suggested_range: Interval,
    pub reasoning: String,
}

/// The merged view of a species selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankProfile {
    /// Resolved selection: known ids, first occurrence order.
    pub selected: Vec<String>,
    pub merged_ranges: MergedRanges,
    pub conflicts: Vec<Conflict>,
    pub recommendations: Vec<Recommendation>,
    pub calibration_presets: CalibrationPresets,
    /// Widest critical range per metric across the selection.
    pub critical_hull: BTreeMap<Metric, Interval>,
    /// Catalog the profile was computed against.  Not serialized; a
    /// deserialized profile judges species-specific severity `ok`.
    #[serde(skip)]
    catalog: Arc<SpeciesCatalog>,
}

impl TankProfile {
    /// Reconcile `selected` species ids against `catalog`.
    ///
    /// Unknown ids are logged and skipped; duplicates count once.
    pub fn compute<S: AsRef<str>>(catalog: &Arc<SpeciesCatalog>, selected: &[S]) -> Self {
        let mut seen = HashSet::new();
        let species: Vec<&SpeciesProfile> = selected
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| seen.insert(*id))
            .filter_map(|id| {
                let found = catalog.get(id);
                if found.is_none() {
                    warn!("unknown species id {id:?} ignored");
                }
                found
            })
            .collect();

        let mut merged_ranges = MergedRanges::new();
        let mut conflicts = Vec::new();
        let mut recommendations = Vec::new();
        let mut critical_hull = BTreeMap::new();

        for metric in Metric::ALL {
            let (names, ranges): (Vec<String>, Vec<Interval>) = species
                .iter()
                .filter_map(|s| s.range(metric).map(|r| (s.name.clone(), *r)))
                .unzip();

            let merged = intersect(&ranges);
            merged_ranges.insert(metric, merged);

            if merged.is_none() && !ranges.is_empty() {
                if let Some(rec) = recommend(metric, &ranges) {
                    recommendations.push(rec);
                }
                conflicts.push(Conflict {
                    metric,
                    species: names,
                    ranges,
                });
            }

            let criticals: Vec<Interval> = species
                .iter()
                .filter_map(|s| s.critical_range(metric).copied())
                .collect();
            if let Some(h) = hull(&criticals) {
                critical_hull.insert(metric, h);
            }
        }

        Self {
            selected: species.iter().map(|s| s.id.clone()).collect(),
            merged_ranges,
            conflicts,
            recommendations,
            calibration_presets: average_presets(&species),
            critical_hull,
            catalog: Arc::clone(catalog),
        }
    }

    pub fn catalog(&self) -> &Arc<SpeciesCatalog> {
        &self.catalog
    }

    /// Agreed range for `metric`, if any.
    pub fn merged(&self, metric: Metric) -> Option<&Interval> {
        self.merged_ranges.get(&metric).and_then(Option::as_ref)
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Classify `value` for `metric`.
    ///
    /// With `species_id`, that species' own ranges are used (any catalog
    /// species, selected or not; unknown ids judge `ok`).  Without, the
    /// merged range and the critical hull of the selection are used; a
    /// conflicted metric has no agreed range and judges `ok`.
    pub fn severity(&self, value: Option<f64>, metric: Metric, species_id: Option<&str>) -> Severity {
        match species_id {
            Some(id) => self.catalog.get(id).map_or(Severity::Ok, |s| {
                classify(value, s.range(metric), s.critical_range(metric))
            }),
            None => classify(value, self.merged(metric), self.critical_hull.get(&metric)),
        }
    }
}

fn recommend(metric: Metric, ranges: &[Interval]) -> Option<Recommendation> {
    let mins: Vec<f64> = ranges.iter().map(Interval::min).collect();
    let maxs: Vec<f64> = ranges.iter().map(Interval::max).collect();
    // The median of the mins never exceeds the median of the maxs since
    // each min <= its max, so this cannot fail for well-formed input.
    let suggested_range = Interval::new(median(&mins)?, median(&maxs)?).ok()?;
    Some(Recommendation {
        metric,
        suggested_range,
        reasoning: format!(
            "Compromise range based on median of {} species requirements",
            ranges.len()
        ),
    })
}

fn average_presets(species: &[&SpeciesProfile]) -> CalibrationPresets {
    let neutral = CalibrationPresets::default();
    let field = |f: fn(&CalibrationPresets) -> f64, fallback: f64| {
        mean(species.iter().map(|s| f(&s.calibration_presets))).unwrap_or(fallback)
    };
    CalibrationPresets {
        ph_offset: field(|c| c.ph_offset, neutral.ph_offset),
        temp_offset: field(|c| c.temp_offset, neutral.temp_offset),
        do_calibration: field(|c| c.do_calibration, neutral.do_calibration),
    }
}
