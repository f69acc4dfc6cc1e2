//! Deterministic replay of one rule over a historical series.
//!
//! Simulation never touches the engine's live [`ActuatorState`]; it runs
//! the same vote/resolve logic as [`RuleEngine::tick`] against a private,
//! hypothetical device state that starts `off` at `window.from` unless the
//! caller says otherwise.  The series is supplied by the history
//! collaborator; nothing here generates data.
//!
//! [`ActuatorState`]: super::ActuatorState

use serde::{Deserialize, Serialize};

use super::RuleEngine;
use super::hysteresis::{ActuatorChange, DeviceState, resolve};
use crate::error::{Error, Result};
use crate::snapshot::{MetricSnapshot, Timestamp};

/// Inclusive time window `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl Window {
    pub fn new(from: Timestamp, to: Timestamp) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.from && ts <= self.to
    }
}

impl RuleEngine {
    /// Replay rule `rule_id` across the samples of `series` that fall inside
    /// `window`, starting with the device off.
    pub fn simulate(
        &self,
        rule_id: &str,
        window: Window,
        series: &[MetricSnapshot],
    ) -> Result<Vec<ActuatorChange>> {
        self.simulate_from(rule_id, window, series, false)
    }

    /// As [`simulate`](Self::simulate) with an explicit initial device state.
    ///
    /// Samples are replayed in timestamp order (stable for equal
    /// timestamps), so the output depends only on the rule, the series and
    /// `initially_on`.
    pub fn simulate_from(
        &self,
        rule_id: &str,
        window: Window,
        series: &[MetricSnapshot],
        initially_on: bool,
    ) -> Result<Vec<ActuatorChange>> {
        let rule = self
            .get(rule_id)
            .ok_or_else(|| Error::RuleNotFound(rule_id.to_owned()))?;
        if window.from > window.to {
            return Err(Error::InvalidWindow {
                from: window.from,
                to: window.to,
            });
        }

        let mut samples: Vec<&MetricSnapshot> =
            series.iter().filter(|s| window.contains(s.ts)).collect();
        let (ticks, max) = (samples.len(), self.config().max_simulation_ticks);
        if ticks > max {
            return Err(Error::SimulationRangeTooLarge { ticks, max });
        }
        samples.sort_by_key(|s| s.ts);

        let mut device = if initially_on {
            DeviceState::on(window.from, rule.rule().action.min_runtime_s)
        } else {
            DeviceState::off(window.from)
        };

        // A device that starts on is this rule's doing.
        let mut latched = initially_on;
        let mut out = Vec::new();
        for snap in samples {
            let Some(ballot) = rule.ballot(snap, device.state, &mut latched) else {
                continue;
            };
            if let Some((change, next)) = resolve(rule.device(), &device, &[ballot], snap.ts) {
                device = next;
                out.push(change);
            }
        }

        log::debug!(
            "simulated {rule_id} over {ticks} samples: {} transitions",
            out.len()
        );
        Ok(out)
    }
}
