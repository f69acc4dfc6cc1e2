//! Severity tiers for a live reading.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// How far a reading strays from a range.  Ordered: `Ok < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `value` against a normal and an optional critical range.
///
/// Missing or NaN readings and a missing normal range are `Ok`: absence is
/// not danger.  Outside the critical range is `Critical`; otherwise outside
/// the normal range is `Warning`.
pub fn classify(value: Option<f64>, range: Option<&Interval>, critical: Option<&Interval>) -> Severity {
    let (Some(value), Some(range)) = (value.filter(|v| !v.is_nan()), range) else {
        return Severity::Ok;
    };
    if critical.is_some_and(|c| !c.contains(value)) {
        Severity::Critical
    } else if !range.contains(value) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
