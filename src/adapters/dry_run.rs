//! Dry-run actuator adapter.
//!
//! Accepts every transition and keeps the full command history, so a
//! replay or preview can show what *would* have been sent to hardware.

use crate::app::ports::{ActuatorError, ActuatorPort};
use crate::rules::ActuatorChange;

#[derive(Debug, Default)]
pub struct DryRunActuators {
    ledger: Vec<ActuatorChange>,
}

impl DryRunActuators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transition accepted so far, in order.
    pub fn ledger(&self) -> &[ActuatorChange] {
        &self.ledger
    }

    pub fn into_ledger(self) -> Vec<ActuatorChange> {
        self.ledger
    }
}

impl ActuatorPort for DryRunActuators {
    fn apply(&mut self, change: &ActuatorChange) -> Result<(), ActuatorError> {
        self.ledger.push(change.clone());
        Ok(())
    }
}
