//! Point-in-time metric readings.
//!
//! A [`MetricSnapshot`] is produced by the sensor-acquisition collaborator
//! once per sampling tick and is never mutated by either engine.  Keys are
//! the dashboard's sensor names (`ph`, `tds`, `do`, `sound`, `waterTemp`,
//! `waterLevel`, `flow`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unix time in whole seconds.
pub type Timestamp = u64;

/// A point-in-time snapshot of every reported metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Sample time.
    pub ts: Timestamp,
    /// Metric name → reading.  Absent keys mean "no reading this tick".
    #[serde(default)]
    pub readings: BTreeMap<String, f64>,
}

impl MetricSnapshot {
    pub fn new(ts: Timestamp) -> Self {
        Self {
            ts,
            readings: BTreeMap::new(),
        }
    }

    /// Builder-style insertion, used mostly by collaborators and tests.
    #[must_use]
    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.readings.insert(metric.into(), value);
        self
    }

    /// Reading for `metric`.  NaN is reported as absent so that a glitched
    /// sensor never satisfies a clause or raises a severity.
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.readings.get(metric).copied().filter(|v| !v.is_nan())
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
