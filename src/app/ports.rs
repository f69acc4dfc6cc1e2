//! Port traits: the hexagonal boundary between the tank core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TankService (domain)
//! ```
//!
//! The actuator collaborator drives real hardware and reports back; the
//! event sink decides where structured events go (UI push, log, MQTT).
//! The [`TankService`](super::service::TankService) consumes both via
//! generics, so the core never performs I/O itself.

use core::fmt;

use crate::rules::ActuatorChange;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain hands each decided transition to this.
///
/// The core does not retry a failed command; the failure is surfaced as
/// an [`AppEvent::ActuatorFailed`](super::events::AppEvent::ActuatorFailed).
pub trait ActuatorPort {
    fn apply(&mut self, change: &ActuatorChange) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → UI / logging)
// ───────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors reported by an [`ActuatorPort`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// No driver is bound to this device id.
    UnknownDevice,
    /// The driver refused or failed the command.
    CommandFailed(String),
    /// The device did not acknowledge in time.
    Timeout,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDevice => write!(f, "unknown device"),
            Self::CommandFailed(msg) => write!(f, "command failed: {msg}"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

impl core::error::Error for ActuatorError {}
