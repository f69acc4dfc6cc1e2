//! Tank service: the hexagonal core.
//!
//! [`TankService`] owns one [`RuleEngine`] and one species selection over
//! a shared, immutable [`SpeciesCatalog`].  It exposes a hardware-agnostic
//! API; all I/O flows through port traits injected at call sites.
//!
//! ```text
//!  MetricSnapshot ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                     │        TankService          │
//!   ActuatorPort ◀──  │  RuleEngine · TankProfile   │
//!                     └────────────────────────────┘
//! ```

use std::sync::Arc;

use log::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::rules::{ActuatorChange, RuleEngine, Window};
use crate::snapshot::MetricSnapshot;
use crate::species::{Metric, Severity, SpeciesCatalog, TankProfile};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink};

// ───────────────────────────────────────────────────────────────
// TankService
// ───────────────────────────────────────────────────────────────

/// Orchestrates both engines for one tank.
pub struct TankService {
    rules: RuleEngine,
    catalog: Arc<SpeciesCatalog>,
    selection: Vec<String>,
    /// Cached reconciliation of `selection`; rebuilt on every change.
    profile: TankProfile,
    warnings_enabled: bool,
    tick_count: u64,
}

impl TankService {
    /// Construct a service with an empty rule set and no species selected.
    pub fn new(config: EngineConfig, catalog: Arc<SpeciesCatalog>) -> Result<Self> {
        config.validate()?;
        let profile = TankProfile::compute::<String>(&catalog, &[]);
        Ok(Self {
            warnings_enabled: config.warnings_enabled,
            rules: RuleEngine::new(config),
            catalog,
            selection: Vec::new(),
            profile,
            tick_count: 0,
        })
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: evaluate rules → hand transitions to the actuator
    /// port → emit species warnings.
    ///
    /// Returns the transitions the port accepted.
    pub fn tick(
        &mut self,
        snap: &MetricSnapshot,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Vec<ActuatorChange> {
        self.tick_count += 1;

        let mut applied = Vec::new();
        for change in self.rules.tick(snap) {
            match hw.apply(&change) {
                Ok(()) => {
                    sink.emit(&AppEvent::ActuatorChanged(change.clone()));
                    applied.push(change);
                }
                Err(e) => {
                    error!("{}: actuator rejected transition: {e}", change.device);
                    sink.emit(&AppEvent::ActuatorFailed { change, error: e });
                }
            }
        }

        if self.warnings_enabled {
            for w in self.profile.warnings(snap) {
                sink.emit(&AppEvent::SpeciesWarning(w));
            }
        }

        applied
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external mutation.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            AppCommand::UpsertRule(rule) => {
                let id = rule.id.clone();
                if let Err(e) = self.rules.upsert(rule) {
                    if let Error::InvalidRule(error) = &e {
                        sink.emit(&AppEvent::RuleRejected {
                            id,
                            error: error.clone(),
                        });
                    }
                    return Err(e);
                }
            }
            AppCommand::RemoveRule(id) => {
                if !self.rules.remove(&id) {
                    info!("remove {id}: no such rule");
                }
            }
            AppCommand::SelectSpecies(ids) => {
                self.selection = ids;
                self.recompute(sink);
            }
            AppCommand::UpdateConfig(config) => {
                config.validate()?;
                self.warnings_enabled = config.warnings_enabled;
                self.rules.set_config(config);
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    /// Swap in a new catalog (e.g. after the persistence collaborator
    /// reloaded it) and recompute the profile.
    pub fn set_catalog(&mut self, catalog: Arc<SpeciesCatalog>, sink: &mut impl EventSink) {
        self.catalog = catalog;
        self.recompute(sink);
    }

    fn recompute(&mut self, sink: &mut impl EventSink) {
        self.profile = TankProfile::compute(&self.catalog, &self.selection);
        if self.profile.has_conflicts() {
            warn!(
                "species selection conflicts on {} metric(s)",
                self.profile.conflicts.len()
            );
        }
        sink.emit(&AppEvent::ProfileRecomputed {
            species: self.profile.selected.len(),
            conflicts: self.profile.conflicts.len(),
        });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn catalog(&self) -> &Arc<SpeciesCatalog> {
        &self.catalog
    }

    pub fn profile(&self) -> &TankProfile {
        &self.profile
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Severity of `value` for `metric`, against one species or the merged
    /// selection.
    pub fn severity(&self, value: Option<f64>, metric: Metric, species_id: Option<&str>) -> Severity {
        self.profile.severity(value, metric, species_id)
    }

    /// Replay a rule over history without touching live actuator state.
    pub fn simulate(
        &self,
        rule_id: &str,
        window: Window,
        series: &[MetricSnapshot],
    ) -> Result<Vec<ActuatorChange>> {
        self.rules.simulate(rule_id, window, series)
    }
}
