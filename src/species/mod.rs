//! Species catalog: per-species safe operating ranges.
//!
//! The catalog is loaded once from the persistence collaborator (JSON, in
//! the dashboard's layout) and is immutable afterwards; share it behind an
//! `Arc` between tanks.  Reconciliation across a selection lives in
//! [`reconcile`], severity tiers and live warnings in [`severity`] and
//! [`warning`].

pub mod reconcile;
pub mod severity;
pub mod warning;

use core::fmt;
use core::str::FromStr;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Error};
use crate::interval::Interval;
pub use reconcile::{Conflict, MergedRanges, Recommendation, TankProfile};
pub use severity::Severity;
pub use warning::SpeciesWarning;

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Water-quality metrics a species profile can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Ph,
    Temp,
    Do,
    Tds,
    Ntu,
}

impl Metric {
    /// Every tracked metric, in reporting order.
    pub const ALL: [Metric; 5] = [Self::Ph, Self::Temp, Self::Do, Self::Tds, Self::Ntu];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Temp => "temp",
            Self::Do => "do",
            Self::Tds => "tds",
            Self::Ntu => "ntu",
        }
    }

    /// Key of this metric in a live [`MetricSnapshot`](crate::snapshot::MetricSnapshot).
    pub fn sensor_key(self) -> &'static str {
        match self {
            Self::Temp => "waterTemp",
            other => other.as_str(),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Temp => "Temperature",
            Self::Do => "Dissolved Oxygen",
            Self::Tds => "TDS",
            Self::Ntu => "Turbidity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ph" => Ok(Self::Ph),
            "temp" | "waterTemp" => Ok(Self::Temp),
            "do" => Ok(Self::Do),
            "tds" => Ok(Self::Tds),
            "ntu" => Ok(Self::Ntu),
            other => Err(UnknownMetric(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metric {:?}", self.0)
    }
}

impl core::error::Error for UnknownMetric {}

// ---------------------------------------------------------------------------
// Species profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSchedule {
    /// Feeding times, `HH:MM`.
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub portions: String,
}

/// Sensor calibration offsets suited to a species' water.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPresets {
    pub ph_offset: f64,
    pub temp_offset: f64,
    pub do_calibration: f64,
}

impl Default for CalibrationPresets {
    /// Neutral presets: no offsets, unit DO gain.
    fn default() -> Self {
        Self {
            ph_offset: 0.0,
            temp_offset: 0.0,
            do_calibration: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    /// Optimal range per metric.
    pub ranges: BTreeMap<Metric, Interval>,
    /// Survivable range per metric; encloses the optimal range.
    #[serde(default)]
    pub critical_ranges: BTreeMap<Metric, Interval>,
    #[serde(default)]
    pub feed_schedule: FeedSchedule,
    #[serde(default)]
    pub calibration_presets: CalibrationPresets,
}

impl SpeciesProfile {
    pub fn range(&self, metric: Metric) -> Option<&Interval> {
        self.ranges.get(&metric)
    }

    pub fn critical_range(&self, metric: Metric) -> Option<&Interval> {
        self.critical_ranges.get(&metric)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for (metric, critical) in &self.critical_ranges {
            if let Some(normal) = self.ranges.get(metric) {
                if !critical.encloses(normal) {
                    return Err(CatalogError::CriticalNarrowerThanNormal {
                        species: self.id.clone(),
                        metric: metric.as_str(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable, validated set of species profiles in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesCatalog {
    profiles: Vec<SpeciesProfile>,
}

impl SpeciesCatalog {
    pub fn new(profiles: Vec<SpeciesProfile>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for p in &profiles {
            if !seen.insert(p.id.as_str()) {
                return Err(CatalogError::DuplicateSpecies(p.id.clone()));
            }
            p.validate()?;
        }
        Ok(Self { profiles })
    }

    /// Parse a JSON array of profiles and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let profiles: Vec<SpeciesProfile> =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Ok(Self::new(profiles)?)
    }

    pub fn get(&self, id: &str) -> Option<&SpeciesProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
