//! Mock actuator and event sink for integration tests.
//!
//! Records every transition so tests can assert on the full command
//! history without touching real relays.

use aquacore::app::events::AppEvent;
use aquacore::app::ports::{ActuatorError, ActuatorPort, EventSink};
use aquacore::rules::ActuatorChange;
use aquacore::snapshot::MetricSnapshot;
use aquacore::species::SpeciesCatalog;

// ── MockActuators ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuators {
    pub calls: Vec<ActuatorChange>,
    /// Devices whose relay refuses every command.
    pub broken: Vec<String>,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken(device: &str) -> Self {
        Self {
            calls: Vec::new(),
            broken: vec![device.to_owned()],
        }
    }

    /// Last commanded state of `device`; off if never commanded.
    pub fn is_on(&self, device: &str) -> bool {
        self.calls
            .iter()
            .rev()
            .find(|c| c.device == device)
            .is_some_and(|c| c.state)
    }

    pub fn calls_for(&self, device: &str) -> Vec<&ActuatorChange> {
        self.calls.iter().filter(|c| c.device == device).collect()
    }
}

impl ActuatorPort for MockActuators {
    fn apply(&mut self, change: &ActuatorChange) -> Result<(), ActuatorError> {
        if self.broken.iter().any(|d| *d == change.device) {
            return Err(ActuatorError::CommandFailed(format!("{} relay stuck", change.device)));
        }
        self.calls.push(change.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<&aquacore::species::SpeciesWarning> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::SpeciesWarning(w) => Some(w),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub const CATALOG_JSON: &str = r#"[
    {
        "id": "goldfish",
        "name": "Goldfish",
        "icon": "🐠",
        "ranges": { "ph": [7.0, 8.4], "temp": [18, 22], "do": [6, 30], "tds": [150, 400], "ntu": [0, 10] },
        "critical_ranges": { "ph": [6.5, 8.8], "temp": [15, 26] },
        "calibration_presets": { "ph_offset": 0.1, "temp_offset": -0.2, "do_calibration": 1.0 }
    },
    {
        "id": "betta",
        "name": "Betta",
        "icon": "🐟",
        "ranges": { "ph": [6.5, 7.5], "temp": [24, 28], "do": [5, 30], "tds": [100, 300], "ntu": [0, 5] },
        "critical_ranges": { "ph": [6.0, 8.0], "temp": [22, 30] },
        "calibration_presets": { "ph_offset": -0.1, "temp_offset": 0.2, "do_calibration": 0.9 }
    },
    {
        "id": "neon",
        "name": "Neon Tetra",
        "icon": "🐡",
        "ranges": { "ph": [6.0, 7.0], "temp": [22, 26], "tds": [50, 150] },
        "critical_ranges": { "ph": [5.5, 7.6] }
    }
]"#;

#[allow(dead_code)]
pub fn catalog() -> SpeciesCatalog {
    SpeciesCatalog::from_json(CATALOG_JSON).unwrap()
}

#[allow(dead_code)]
pub fn ph(ts: u64, value: f64) -> MetricSnapshot {
    MetricSnapshot::new(ts).with("ph", value)
}
