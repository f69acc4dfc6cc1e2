//! Automation rules: definitions, validation, and the engine that turns
//! metric snapshots into actuator transitions.
//!
//! ```text
//!  MetricSnapshot ──▶ Condition::evaluate ──▶ hysteresis vote ──┐
//!                                                              ▼
//!              ActuatorState ◀── resolve (fail-safe-on, min runtime)
//! ```
//!
//! A [`Rule`] is the editable, serializable definition.  Before it enters
//! the rule set it is checked and frozen into a [`PreparedRule`], which
//! carries the hysteresis [`Direction`] and trigger metric resolved once
//! at upsert time instead of on every evaluation.

pub mod condition;
pub mod engine;
pub mod hysteresis;
pub mod simulate;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RuleError;
pub use condition::{Clause, CompareOp, Composite, Condition, LogicOp};
pub use engine::RuleEngine;
pub use hysteresis::{ActuatorChange, ActuatorState, DeviceState, Direction};
pub use simulate::Window;

/// Unique rule identifier.
pub type RuleId = String;

// ---------------------------------------------------------------------------
// Rule definition
// ---------------------------------------------------------------------------

/// An automation rule as authored by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    pub condition: Condition,
    pub action: Action,
    pub hysteresis: Hysteresis,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// What a rule does to its device when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Target device id (e.g. `pump`, `heater`, `aerator`).
    pub device: String,
    /// `true` energizes the device, `false` de-energizes it.
    #[serde(deserialize_with = "bool_or_flag")]
    pub state: bool,
    /// Minimum seconds the device stays on once this rule turned it on.
    #[serde(default)]
    pub min_runtime_s: u64,
}

/// Dual thresholds gating the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hysteresis {
    pub on: f64,
    pub off: f64,
    /// Metric the thresholds apply to.  Defaults to the first clause metric
    /// of the condition (depth-first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

impl Hysteresis {
    pub fn new(on: f64, off: f64) -> Self {
        Self {
            on,
            off,
            metric: None,
        }
    }

    /// Direction implied by the threshold order.
    pub fn direction(&self) -> Result<Direction, RuleError> {
        if !self.on.is_finite() || !self.off.is_finite() {
            return Err(RuleError::NonFiniteThreshold);
        }
        if self.on > self.off {
            Ok(Direction::Rising)
        } else if self.on < self.off {
            Ok(Direction::Falling)
        } else {
            Err(RuleError::DegenerateHysteresis)
        }
    }
}

/// Accepts `true`/`false` as well as the editor's `1`/`0`.
fn bool_or_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(de)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(serde::de::Error::custom(format!(
            "action state must be a boolean, 0 or 1 (got {n})"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Prepared rule
// ---------------------------------------------------------------------------

/// A rule that passed validation, with its hysteresis direction and trigger
/// metric resolved.  Immutable; the engine replaces it whole on update.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRule {
    rule: Rule,
    direction: Direction,
    trigger: String,
}

impl PreparedRule {
    /// Validate `rule` and freeze it.
    pub fn prepare(rule: Rule, max_depth: usize) -> Result<Self, RuleError> {
        if rule.id.trim().is_empty() {
            return Err(RuleError::EmptyId);
        }
        if rule.action.device.trim().is_empty() {
            return Err(RuleError::EmptyDevice);
        }
        rule.condition.validate(max_depth)?;
        let direction = rule.hysteresis.direction()?;

        let trigger = match &rule.hysteresis.metric {
            Some(m) if rule.condition.metrics().contains(&m.as_str()) => m.clone(),
            Some(m) => return Err(RuleError::UnknownTriggerMetric(m.clone())),
            // validate() guarantees at least one clause.
            None => rule
                .condition
                .first_metric()
                .ok_or(RuleError::EmptyComposite)?
                .to_owned(),
        };

        Ok(Self {
            rule,
            direction,
            trigger,
        })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn device(&self) -> &str {
        &self.rule.action.device
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Metric whose reading is tested against the hysteresis thresholds.
    pub fn trigger_metric(&self) -> &str {
        &self.trigger
    }
}
