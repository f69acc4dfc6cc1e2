//! Unified error types for the tank core.
//!
//! A single `Error` enum that every subsystem converts into, so a
//! collaborator calling into either engine handles failures uniformly.
//! Missing metrics and missing readings are not errors:
//! they degrade to fail-closed clauses and `ok` severities.

use core::fmt;

use crate::rules::RuleId;
use crate::snapshot::Timestamp;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A rule failed validation and never entered the rule set.
    InvalidRule(RuleError),
    /// No rule with the given id exists.
    RuleNotFound(RuleId),
    /// A simulation window holds more samples than the configured bound.
    SimulationRangeTooLarge { ticks: usize, max: usize },
    /// A simulation window whose start lies after its end.
    InvalidWindow { from: Timestamp, to: Timestamp },
    /// The species catalog is malformed.
    Catalog(CatalogError),
    /// Engine configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRule(e) => write!(f, "invalid rule: {e}"),
            Self::RuleNotFound(id) => write!(f, "rule not found: {id}"),
            Self::SimulationRangeTooLarge { ticks, max } => {
                write!(f, "simulation window has {ticks} samples (max {max})")
            }
            Self::InvalidWindow { from, to } => {
                write!(f, "invalid window: from {from} is after to {to}")
            }
            Self::Catalog(e) => write!(f, "catalog: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Rule validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Rule id is empty.
    EmptyId,
    /// Action targets an empty device id.
    EmptyDevice,
    /// A composite node has no children.
    EmptyComposite,
    /// A clause names an empty metric.
    EmptyMetric,
    /// A clause value or hysteresis threshold is NaN or infinite.
    NonFiniteThreshold,
    /// `hysteresis.on == hysteresis.off`: no deadband, direction unknowable.
    DegenerateHysteresis,
    /// Condition tree nests deeper than the configured maximum.
    TooDeep { max: usize },
    /// The hysteresis metric is not referenced by any clause.
    UnknownTriggerMetric(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "empty rule id"),
            Self::EmptyDevice => write!(f, "empty device id"),
            Self::EmptyComposite => write!(f, "composite condition has no clauses"),
            Self::EmptyMetric => write!(f, "clause has an empty metric"),
            Self::NonFiniteThreshold => write!(f, "non-finite threshold"),
            Self::DegenerateHysteresis => write!(f, "hysteresis on and off thresholds are equal"),
            Self::TooDeep { max } => write!(f, "condition nests deeper than {max}"),
            Self::UnknownTriggerMetric(m) => {
                write!(f, "hysteresis metric {m:?} not used by the condition")
            }
        }
    }
}

impl From<RuleError> for Error {
    fn from(e: RuleError) -> Self {
        Self::InvalidRule(e)
    }
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Two profiles share an id.
    DuplicateSpecies(String),
    /// A critical range does not contain the normal range for that metric.
    CriticalNarrowerThanNormal { species: String, metric: &'static str },
    /// The catalog document could not be parsed.
    Malformed(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSpecies(id) => write!(f, "duplicate species id {id:?}"),
            Self::CriticalNarrowerThanNormal { species, metric } => write!(
                f,
                "{species}: critical {metric} range does not contain the normal range"
            ),
            Self::Malformed(msg) => write!(f, "malformed catalog: {msg}"),
        }
    }
}

impl From<CatalogError> for Error {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
