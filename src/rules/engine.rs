//! The rule engine: owned rule set plus live actuator state.
//!
//! One engine per tank.  Rules are stored as `Arc<PreparedRule>` and
//! replaced whole on update, so a reader holding a rule (a running
//! simulation, a [`RuleEngine::rules`] snapshot) always sees either the old
//! or the new definition, never a mix of fields.  Mutation takes
//! `&mut self`: at most one writer at a time.
//!
//! Besides device state the engine remembers which energize rules are
//! latched (see [`super::hysteresis`]).  Replacing or removing a rule drops
//! its latch.  Removing or disabling the last rule that holds a device on
//! leaves the device on: the engine only switches a device off on some
//! rule's `Off` vote, and [`RuleEngine::force_actuator`] is the way to turn
//! an orphaned device off.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, info, warn};

use super::hysteresis::{ActuatorChange, ActuatorState, Ballot, DeviceState, resolve};
use super::{PreparedRule, Rule, RuleId};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::snapshot::{MetricSnapshot, Timestamp};

/// Automation rule engine.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<PreparedRule>>,
    actuators: ActuatorState,
    latched: BTreeSet<RuleId>,
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: Vec::new(),
            actuators: ActuatorState::new(),
            latched: BTreeSet::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap limits.  Rules already in the set are not re-validated.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    // ── Rule set ──────────────────────────────────────────────

    /// Validate and insert `rule`, replacing any rule with the same id in
    /// place.  Its device is registered (off) if new.  A replaced rule
    /// starts unlatched; its device keeps its state.
    pub fn upsert(&mut self, rule: Rule) -> Result<()> {
        let prepared = PreparedRule::prepare(rule, self.config.max_condition_depth).map_err(|e| {
            warn!("rule rejected: {e}");
            Error::InvalidRule(e)
        })?;
        debug!(
            "rule {} prepared: trigger {} ({:?})",
            prepared.id(),
            prepared.trigger_metric(),
            prepared.direction()
        );
        let prepared = Arc::new(prepared);

        self.actuators.register(prepared.device());
        self.latched.remove(prepared.id());

        match self.rules.iter().position(|r| r.id() == prepared.id()) {
            Some(idx) => {
                info!("rule {} updated", prepared.id());
                self.rules[idx] = prepared;
            }
            None => {
                info!("rule {} added", prepared.id());
                self.rules.push(prepared);
            }
        }
        Ok(())
    }

    /// Remove rule `id`.  Idempotent: returns whether a rule was removed.
    ///
    /// The rule's device keeps its state, even if this rule was the only
    /// one holding it on.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id() != id);
        self.latched.remove(id);
        let removed = self.rules.len() != before;
        if removed {
            info!("rule {id} removed");
        }
        removed
    }

    /// Rules in insertion order (updates keep their slot).
    pub fn list(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|r| r.rule())
    }

    pub fn get(&self, id: &str) -> Option<Arc<PreparedRule>> {
        self.rules.iter().find(|r| r.id() == id).cloned()
    }

    /// Cheap snapshot of the current rule set for concurrent readers.
    pub fn rules(&self) -> Vec<Arc<PreparedRule>> {
        self.rules.clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // ── Actuators ─────────────────────────────────────────────

    pub fn actuators(&self) -> &ActuatorState {
        &self.actuators
    }

    /// Whether rule `id` switched its device on and has not yet seen its
    /// off-threshold.
    pub fn is_latched(&self, id: &str) -> bool {
        self.latched.contains(id)
    }

    /// Record an externally driven device state (manual toggle, boot-time
    /// readback).  No minimum runtime applies to a forced `on`.
    pub fn force_actuator(&mut self, device: &str, on: bool, ts: Timestamp) {
        let state = if on {
            DeviceState::on(ts, 0)
        } else {
            DeviceState::off(ts)
        };
        info!("{device} forced {}", if on { "ON" } else { "OFF" });
        self.actuators.set(device, state);
    }

    // ── Evaluation ────────────────────────────────────────────

    /// Run one evaluation pass over every enabled rule and apply the
    /// resulting transitions to the live actuator state.
    ///
    /// Returns the transitions in device-id order.
    pub fn tick(&mut self, snap: &MetricSnapshot) -> Vec<ActuatorChange> {
        let mut ballots: BTreeMap<&str, Vec<Ballot<'_>>> = BTreeMap::new();
        for rule in self.rules.iter().filter(|r| r.rule().enabled) {
            let device_on = self.actuators.is_on(rule.device());
            let mut latched = self.latched.contains(rule.id());
            let ballot = rule.ballot(snap, device_on, &mut latched);
            if latched {
                self.latched.insert(rule.id().to_owned());
            } else {
                self.latched.remove(rule.id());
            }
            if let Some(b) = ballot {
                ballots.entry(rule.device()).or_default().push(b);
            }
        }

        let mut decided = Vec::new();
        for (device, votes) in &ballots {
            let current = self.actuators.get(device).copied().unwrap_or_default();
            if let Some(transition) = resolve(device, &current, votes, snap.ts) {
                decided.push(transition);
            }
        }

        let mut changes = Vec::with_capacity(decided.len());
        for (change, next) in decided {
            info!(
                "{} -> {} at {} (rule {})",
                change.device,
                if change.state { "ON" } else { "OFF" },
                change.ts,
                change.rule_id
            );
            self.actuators.set(&change.device, next);
            changes.push(change);
        }
        changes
    }
}
