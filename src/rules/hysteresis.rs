//! Hysteresis gating and per-device conflict resolution.
//!
//! Each enabled rule casts at most one [`Vote`] per pass for its device;
//! [`resolve`] folds the votes for one device into at most one transition.
//!
//! ## Rule votes
//!
//! An energize rule is *latched* once it has itself switched its device on
//! (condition true, on-threshold crossed) and stays latched until its own
//! off-threshold is crossed.  Only a latched rule holds its device on
//! through the deadband; an idle rule sitting between its thresholds never
//! keeps a device on that another rule turned on.
//!
//! | rule action  | device | latched | condition | trigger reading       | vote          |
//! |--------------|--------|---------|-----------|-----------------------|---------------|
//! | energize     | off    | -       | true      | on-threshold crossed  | On, latch     |
//! | energize     | on     | no      | true      | on-threshold crossed  | On, latch     |
//! | energize     | on     | no      | false     | off-threshold crossed | Off           |
//! | energize     | on     | yes     | true      | any                   | On            |
//! | energize     | on     | yes     | false     | still inside deadband | On            |
//! | energize     | on     | yes     | false     | off-threshold crossed | Off, unlatch  |
//! | de-energize  | on     | -       | true      | on-threshold crossed  | Off           |
//!
//! Every other combination abstains; an energize rule on an `off` device
//! that abstains is unlatched.  A rule whose trigger metric is missing from
//! the snapshot abstains and keeps its latch.
//!
//! ## Device resolution
//!
//! 1. Any `On` beats any `Off` (fail-safe-on); among `On` voters the
//!    lowest rule id wins and its `min_runtime_s` becomes the hold.
//! 2. An `Off` only takes effect once the hold has elapsed since the
//!    device turned on.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Hysteresis, PreparedRule, RuleId};
use crate::snapshot::{MetricSnapshot, Timestamp};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which side of the deadband turns the device on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `on > off`: on at or above `on`, off at or below `off`.
    Rising,
    /// `on < off`: on at or below `on`, off at or above `off`.
    Falling,
}

impl Direction {
    pub fn crossed_on(self, value: f64, h: &Hysteresis) -> bool {
        match self {
            Self::Rising => value >= h.on,
            Self::Falling => value <= h.on,
        }
    }

    pub fn crossed_off(self, value: f64, h: &Hysteresis) -> bool {
        match self {
            Self::Rising => value <= h.off,
            Self::Falling => value >= h.off,
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator state
// ---------------------------------------------------------------------------

/// Decided state of one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub state: bool,
    /// Time of the last transition (0 if the device never moved).
    pub since: Timestamp,
    /// Seconds the device must stay on after `since`.
    #[serde(default)]
    pub hold_s: u64,
}

impl DeviceState {
    pub fn off(since: Timestamp) -> Self {
        Self {
            state: false,
            since,
            hold_s: 0,
        }
    }

    pub fn on(since: Timestamp, hold_s: u64) -> Self {
        Self {
            state: true,
            since,
            hold_s,
        }
    }

    /// True while an `on` device is inside its minimum runtime.
    pub fn is_held(&self, ts: Timestamp) -> bool {
        self.state && ts < self.since.saturating_add(self.hold_s)
    }
}

/// Device id → decided state.  One entry per device any rule has targeted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActuatorState(BTreeMap<String, DeviceState>);

impl ActuatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device: &str) -> Option<&DeviceState> {
        self.0.get(device)
    }

    /// `true` if the device is known and on.
    pub fn is_on(&self, device: &str) -> bool {
        self.0.get(device).is_some_and(|d| d.state)
    }

    /// Ensure `device` has an entry; new devices start off.
    pub fn register(&mut self, device: &str) {
        if !self.0.contains_key(device) {
            self.0.insert(device.to_owned(), DeviceState::default());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceState)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn set(&mut self, device: &str, state: DeviceState) {
        self.0.insert(device.to_owned(), state);
    }
}

/// A decided transition, handed to the actuator collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorChange {
    pub ts: Timestamp,
    pub device: String,
    pub state: bool,
    /// Rule that carried the decision.
    pub rule_id: RuleId,
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vote {
    On,
    Off,
}

/// One rule's vote for one device in one pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ballot<'a> {
    pub rule_id: &'a str,
    pub vote: Vote,
    pub min_runtime_s: u64,
}

impl PreparedRule {
    /// What this rule wants for its device, given the device's current
    /// state and this rule's latch, which is updated in place.  `None`
    /// abstains.
    pub(crate) fn vote(&self, snap: &MetricSnapshot, device_on: bool, latched: &mut bool) -> Option<Vote> {
        let reading = snap.get(self.trigger_metric())?;
        let rule = self.rule();
        let h = &rule.hysteresis;
        let dir = self.direction();
        let active = rule.condition.evaluate(snap);
        let fired = active && dir.crossed_on(reading, h);
        let released = dir.crossed_off(reading, h);

        if !rule.action.state {
            *latched = false;
            return (device_on && fired).then_some(Vote::Off);
        }

        match (device_on, *latched) {
            (false, _) => {
                *latched = fired;
                fired.then_some(Vote::On)
            }
            (true, true) if active || !released => Some(Vote::On),
            (true, true) => {
                *latched = false;
                Some(Vote::Off)
            }
            (true, false) if fired => {
                *latched = true;
                Some(Vote::On)
            }
            (true, false) => (!active && released).then_some(Vote::Off),
        }
    }

    pub(crate) fn ballot(
        &self,
        snap: &MetricSnapshot,
        device_on: bool,
        latched: &mut bool,
    ) -> Option<Ballot<'_>> {
        self.vote(snap, device_on, latched).map(|vote| Ballot {
            rule_id: self.id(),
            vote,
            min_runtime_s: self.rule().action.min_runtime_s,
        })
    }
}

/// Fold one device's ballots into at most one transition.
pub(crate) fn resolve(
    device: &str,
    current: &DeviceState,
    ballots: &[Ballot<'_>],
    ts: Timestamp,
) -> Option<(ActuatorChange, DeviceState)> {
    let lowest = |want: Vote| {
        ballots
            .iter()
            .filter(|b| b.vote == want)
            .min_by(|a, b| a.rule_id.cmp(b.rule_id))
    };

    if let Some(winner) = lowest(Vote::On) {
        if current.state {
            return None;
        }
        let change = ActuatorChange {
            ts,
            device: device.to_owned(),
            state: true,
            rule_id: winner.rule_id.to_owned(),
        };
        return Some((change, DeviceState::on(ts, winner.min_runtime_s)));
    }

    let winner = lowest(Vote::Off)?;
    if !current.state {
        return None;
    }
    if current.is_held(ts) {
        debug!(
            "{device}: off requested by {} vetoed, {}s of {}s minimum runtime elapsed",
            winner.rule_id,
            ts.saturating_sub(current.since),
            current.hold_s
        );
        return None;
    }
    let change = ActuatorChange {
        ts,
        device: device.to_owned(),
        state: false,
        rule_id: winner.rule_id.to_owned(),
    };
    Some((change, DeviceState::off(ts)))
}
