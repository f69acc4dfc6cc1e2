//! Per-species warnings for a live snapshot.
//!
//! For every selected species and every metric that species constrains,
//! a reading that classifies above `ok` becomes a [`SpeciesWarning`] with a
//! short message and a suggested corrective action.  Warning ids are
//! stable (`<species>-<metric>-<severity>`) so a UI can dismiss them.

use serde::{Deserialize, Serialize};

use super::severity::{Severity, classify};
use super::{Metric, SpeciesProfile, TankProfile};
use crate::snapshot::MetricSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesWarning {
    pub id: String,
    pub species_id: String,
    pub species_name: String,
    pub species_icon: String,
    pub metric: Metric,
    pub value: f64,
    pub severity: Severity,
    pub message: String,
    pub recommended_action: String,
}

impl TankProfile {
    /// Warnings for every selected species against `snap`, in selection
    /// then metric order.
    pub fn warnings(&self, snap: &MetricSnapshot) -> Vec<SpeciesWarning> {
        let mut out = Vec::new();
        for species in self.selected.iter().filter_map(|id| self.catalog().get(id)) {
            for metric in Metric::ALL {
                let Some(value) = snap.get(metric.sensor_key()) else {
                    continue;
                };
                if let Some(w) = species_warning(species, metric, value) {
                    out.push(w);
                }
            }
        }
        out
    }
}

/// Warning for one species and metric, or `None` when the reading is fine.
pub fn species_warning(species: &SpeciesProfile, metric: Metric, value: f64) -> Option<SpeciesWarning> {
    let range = species.range(metric)?;
    let critical = species.critical_range(metric);
    let severity = classify(Some(value), Some(range), critical);

    let (message, recommended_action) = match severity {
        Severity::Ok => return None,
        Severity::Critical => {
            let upper = critical.map_or(range.max(), |c| c.max());
            let high = value > upper;
            match metric {
                Metric::Temp if high => (
                    format!("Temperature {value:.1}°C is too high"),
                    "Reduce heater or increase cooling".to_owned(),
                ),
                Metric::Temp => (
                    format!("Temperature {value:.1}°C is too low"),
                    "Increase heater or reduce cooling".to_owned(),
                ),
                Metric::Ph if high => (
                    format!("pH {value:.1} is too high"),
                    "Add pH reducer or increase aeration".to_owned(),
                ),
                Metric::Ph => (
                    format!("pH {value:.1} is too low"),
                    "Add pH increaser or reduce aeration".to_owned(),
                ),
                other => (
                    format!("{} {value:.1} is out of critical range", other.label()),
                    format!("Adjust {} to target range", other.label()),
                ),
            }
        }
        Severity::Warning => {
            let side = if value > range.max() { "above" } else { "below" };
            (
                format!("{} {value:.1} is {side} optimal range", metric.label()),
                "Monitor and adjust if needed".to_owned(),
            )
        }
    };

    Some(SpeciesWarning {
        id: format!("{}-{}-{}", species.id, metric, severity),
        species_id: species.id.clone(),
        species_name: species.name.clone(),
        species_icon: species.icon.clone(),
        metric,
        value,
        severity,
        message,
        recommended_action,
    })
}
