//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  A UI push or MQTT adapter would implement the same
//! trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::species::Severity;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ActuatorChanged(c) => {
                info!(
                    "ACTUATOR | {} -> {} at {} (rule {})",
                    c.device,
                    if c.state { "ON" } else { "OFF" },
                    c.ts,
                    c.rule_id
                );
            }
            AppEvent::ActuatorFailed { change, error: e } => {
                error!("ACTUATOR | {} failed: {e}", change.device);
            }
            AppEvent::ProfileRecomputed { species, conflicts } => {
                info!("PROFILE | species={species} conflicts={conflicts}");
            }
            AppEvent::SpeciesWarning(w) if w.severity == Severity::Critical => {
                error!("SPECIES | {} {}: {}", w.species_icon, w.species_name, w.message);
            }
            AppEvent::SpeciesWarning(w) => {
                warn!("SPECIES | {} {}: {}", w.species_icon, w.species_name, w.message);
            }
            AppEvent::RuleRejected { id, error: e } => {
                warn!("RULE | {id} rejected: {e}");
            }
        }
    }
}
