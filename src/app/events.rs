//! Outbound application events.
//!
//! The [`TankService`](super::service::TankService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::error::RuleError;
use crate::rules::{ActuatorChange, RuleId};
use crate::species::SpeciesWarning;

use super::ports::ActuatorError;

/// Structured events emitted by the tank core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A device transition was decided and accepted by the actuator port.
    ActuatorChanged(ActuatorChange),

    /// The actuator port rejected a decided transition.
    ActuatorFailed {
        change: ActuatorChange,
        error: ActuatorError,
    },

    /// The tank profile was recomputed (selection or catalog changed).
    ProfileRecomputed { species: usize, conflicts: usize },

    /// A selected species is outside its comfort range.
    SpeciesWarning(SpeciesWarning),

    /// An upserted rule failed validation.
    RuleRejected { id: RuleId, error: RuleError },
}
