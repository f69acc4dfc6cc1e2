//! Engine configuration parameters
//!
//! Tunable limits for the rule engine and the tank service. Loaded by the
//! collaborator (typically from JSON) and hot-reloadable through
//! `AppCommand::UpdateConfig`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // --- Simulation ---
    /// Maximum number of samples a single `simulate` call may replay
    pub max_simulation_ticks: usize,

    // --- Rule validation ---
    /// Maximum nesting depth of a condition tree (a lone clause is depth 1)
    pub max_condition_depth: usize,

    // --- Service ---
    /// Emit per-species warnings on every tick
    pub warnings_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // 30 days at one sample per minute is 43 200 ticks.
            max_simulation_ticks: 50_000,
            max_condition_depth: 32,
            warnings_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Reject values that would disable a guard outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_simulation_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_simulation_ticks must be at least 1",
            ));
        }
        if self.max_condition_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_condition_depth must be at least 1",
            ));
        }
        Ok(())
    }
}
