//! Inbound commands to the tank service.
//!
//! These represent mutations requested by the outside world (rule editor,
//! species picker, settings screen).  The service applies them one at a
//! time, which is what makes it the single writer of the rule set.

use crate::config::EngineConfig;
use crate::rules::{Rule, RuleId};

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Create or replace a rule.
    UpsertRule(Rule),

    /// Delete a rule (idempotent).
    RemoveRule(RuleId),

    /// Replace the selected species set (ordered).
    SelectSpecies(Vec<String>),

    /// Hot-reload engine limits.
    UpdateConfig(EngineConfig),
}
