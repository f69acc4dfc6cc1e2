//! Closed numeric intervals and the small set of statistics both engines
//! share.
//!
//! An [`Interval`] serializes as a `[min, max]` pair, matching the catalog
//! layout the dashboard uses.  Construction enforces `min <= max` and
//! finite bounds; every other type in the crate relies on that.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Interval {
    min: f64,
    max: f64,
}

/// Returned when a `[min, max]` pair is inverted or not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidInterval {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for InvalidInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid interval [{}, {}]", self.min, self.max)
    }
}

impl core::error::Error for InvalidInterval {}

impl Interval {
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidInterval> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True if `other` lies entirely inside `self`.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

impl TryFrom<[f64; 2]> for Interval {
    type Error = InvalidInterval;

    fn try_from([min, max]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}

impl From<Interval> for [f64; 2] {
    fn from(i: Interval) -> Self {
        [i.min, i.max]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ── Set operations ────────────────────────────────────────────

/// Intersection of every interval in `ranges`.
///
/// Empty input yields `None`; a single interval is returned unchanged;
/// otherwise the result is `[max(mins), min(maxs)]`, or `None` when
/// `max(mins) > min(maxs)` (no common overlap).
pub fn intersect(ranges: &[Interval]) -> Option<Interval> {
    let (first, rest) = ranges.split_first()?;
    rest.iter().try_fold(*first, |acc, r| {
        let lo = acc.min.max(r.min);
        let hi = acc.max.min(r.max);
        (lo <= hi).then_some(Interval { min: lo, max: hi })
    })
}

/// Smallest interval covering every input (`[min of mins, max of maxs]`).
pub fn hull(ranges: &[Interval]) -> Option<Interval> {
    let (first, rest) = ranges.split_first()?;
    Some(rest.iter().fold(*first, |acc, r| Interval {
        min: acc.min.min(r.min),
        max: acc.max.max(r.max),
    }))
}

// ── Statistics ────────────────────────────────────────────────

/// Standard median: the middle value, or the mean of the two middle values
/// for an even count.  `None` for empty input.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean.  `None` for empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
