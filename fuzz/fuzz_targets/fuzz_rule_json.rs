//! Fuzz target: rule definitions from the editor
//!
//! Feeds arbitrary bytes through the rule JSON decoder and, for anything
//! that decodes, through upsert and a few evaluation passes, verifying:
//! - No panics on hostile trees (deep nesting, NaN thresholds, empty ids)
//! - A rejected rule never enters the rule set
//! - At most one transition per device per pass
//!
//! cargo fuzz run fuzz_rule_json

#![no_main]

use aquacore::rules::{Rule, RuleEngine};
use aquacore::snapshot::MetricSnapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(rule) = serde_json::from_slice::<Rule>(data) else {
        return;
    };

    let mut engine = RuleEngine::default();
    let id = rule.id.clone();
    match engine.upsert(rule) {
        Ok(()) => assert!(engine.get(&id).is_some()),
        Err(_) => {
            assert!(engine.is_empty());
            return;
        }
    }

    let trigger = engine.get(&id).map(|r| r.trigger_metric().to_owned());
    let Some(trigger) = trigger else { return };
    for (ts, v) in [(0, -1e9), (10, 0.0), (20, 1e9), (30, f64::NAN), (40, 0.0)] {
        let changes = engine.tick(&MetricSnapshot::new(ts).with(trigger.clone(), v));
        assert!(changes.len() <= 1);
    }
});
