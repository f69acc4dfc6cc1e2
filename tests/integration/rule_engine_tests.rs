//! Rule engine through its public API: JSON rules as the editor saves them,
//! multi-rule devices, and replay against live state.

use aquacore::Error;
use aquacore::config::EngineConfig;
use aquacore::error::RuleError;
use aquacore::rules::{Composite, Condition, LogicOp, Rule, RuleEngine, Window};
use aquacore::snapshot::MetricSnapshot;

use crate::mock_hw::ph;

fn rule(json: &str) -> Rule {
    serde_json::from_str(json).unwrap()
}

fn ph_pump() -> Rule {
    rule(
        r#"{
            "id": "r1",
            "name": "High pH pump",
            "condition": { "metric": "ph", "op": ">", "value": 7.8 },
            "action": { "device": "pump", "state": true, "min_runtime_s": 600 },
            "hysteresis": { "on": 7.9, "off": 7.6 }
        }"#,
    )
}

fn cold_heater() -> Rule {
    rule(
        r#"{
            "id": "heat",
            "condition": { "op": "or", "clauses": [
                { "metric": "waterTemp", "op": "<", "value": 23 },
                { "op": "and", "clauses": [
                    { "metric": "waterTemp", "op": "<", "value": 24 },
                    { "metric": "ph", "op": "<", "value": 6.8 }
                ]}
            ]},
            "action": { "device": "heater", "state": 1 },
            "hysteresis": { "on": 23, "off": 25 }
        }"#,
    )
}

// ── Anti-chatter ──────────────────────────────────────────────

#[test]
fn minimum_runtime_holds_pump_on() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();

    let t0 = 1_700_000_000;
    let on = engine.tick(&ph(t0, 8.0));
    assert_eq!(on.len(), 1);
    assert!(on[0].state);
    assert_eq!(on[0].rule_id, "r1");

    assert!(engine.tick(&ph(t0 + 300, 7.5)).is_empty(), "held inside min runtime");
    assert!(engine.actuators().is_on("pump"));

    let off = engine.tick(&ph(t0 + 601, 7.5));
    assert_eq!(off.len(), 1);
    assert!(!off[0].state);
    assert_eq!(off[0].ts, t0 + 601);
}

#[test]
fn oscillation_inside_deadband_never_toggles() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();

    let mut changes = engine.tick(&ph(0, 7.95));
    for (i, v) in [7.7, 7.85, 7.65, 7.79, 7.7].into_iter().enumerate() {
        changes.extend(engine.tick(&ph(1_000 * (i as u64 + 1), v)));
    }
    assert_eq!(changes.len(), 1, "only the initial switch-on: {changes:?}");
}

// ── Fail-safe-on ──────────────────────────────────────────────

#[test]
fn any_rule_wanting_on_keeps_device_on() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();
    engine
        .upsert(rule(
            r#"{
                "id": "r2",
                "condition": { "metric": "ntu", "op": ">", "value": 20 },
                "action": { "device": "pump", "state": true },
                "hysteresis": { "on": 25, "off": 15 }
            }"#,
        ))
        .unwrap();
    engine
        .upsert(rule(
            r#"{
                "id": "r0-quiet",
                "condition": { "metric": "tds", "op": "<", "value": 100 },
                "action": { "device": "pump", "state": false },
                "hysteresis": { "on": 90, "off": 120 }
            }"#,
        ))
        .unwrap();

    let on = engine.tick(&MetricSnapshot::new(0).with("ph", 7.0).with("ntu", 30.0));
    assert_eq!(on.len(), 1);
    assert_eq!(on[0].rule_id, "r2");

    // pH rule would switch off, quiet-hours rule would switch off, but
    // turbidity is still high.
    let snap = MetricSnapshot::new(10)
        .with("ph", 7.0)
        .with("ntu", 22.0)
        .with("tds", 80.0);
    assert!(engine.tick(&snap).is_empty());
    assert!(engine.actuators().is_on("pump"));

    // Turbidity clears: everyone agrees on off.
    let snap = MetricSnapshot::new(20)
        .with("ph", 7.0)
        .with("ntu", 10.0)
        .with("tds", 80.0);
    let off = engine.tick(&snap);
    assert_eq!(off.len(), 1);
    assert!(!off[0].state);
    assert_eq!(off[0].rule_id, "r0-quiet");
}

#[test]
fn idle_rule_in_deadband_does_not_hold_device_on() {
    let mut engine = RuleEngine::default();
    let mut r1 = ph_pump();
    r1.action.min_runtime_s = 0;
    engine.upsert(r1).unwrap();
    engine
        .upsert(rule(
            r#"{
                "id": "r2",
                "condition": { "metric": "ntu", "op": ">", "value": 20 },
                "action": { "device": "pump", "state": true },
                "hysteresis": { "on": 25, "off": 15 }
            }"#,
        ))
        .unwrap();

    // Turbidity sits between r2's thresholds the whole time and r2 never
    // switched the pump on.
    let t0 = 1_700_000_000;
    let history: Vec<MetricSnapshot> = (0..6)
        .map(|h| {
            let v = if h == 0 { 8.0 } else { 7.0 };
            MetricSnapshot::new(t0 + h * 3_600).with("ph", v).with("ntu", 18.0)
        })
        .collect();

    let simulated = engine.simulate("r1", Window::new(t0, t0 + 5 * 3_600), &history).unwrap();

    let mut live = Vec::new();
    for snap in &history {
        live.extend(engine.tick(snap));
    }
    assert_eq!(live.len(), 2, "{live:?}");
    assert!(live[0].state);
    assert!(!live[1].state);
    assert_eq!(live[1].ts, t0 + 3_600);
    assert_eq!(live[1].rule_id, "r1");
    assert!(!engine.actuators().is_on("pump"));
    assert!(!engine.is_latched("r2"));

    // r2 never voted, so r1 alone reproduces the live run.
    assert_eq!(simulated, live);
}

#[test]
fn latched_rule_holds_device_after_the_other_releases() {
    let mut engine = RuleEngine::default();
    let mut r1 = ph_pump();
    r1.action.min_runtime_s = 0;
    engine.upsert(r1).unwrap();
    engine
        .upsert(rule(
            r#"{
                "id": "r2",
                "condition": { "metric": "ntu", "op": ">", "value": 20 },
                "action": { "device": "pump", "state": true },
                "hysteresis": { "on": 25, "off": 15 }
            }"#,
        ))
        .unwrap();

    let snap = |ts, ph, ntu| MetricSnapshot::new(ts).with("ph", ph).with("ntu", ntu);
    assert_eq!(engine.tick(&snap(0, 8.0, 10.0)).len(), 1);
    // Turbidity spikes while the pump is already on: r2 latches too.
    assert!(engine.tick(&snap(60, 8.0, 30.0)).is_empty());
    assert!(engine.is_latched("r1") && engine.is_latched("r2"));

    // pH recovers, turbidity drifts back into r2's deadband.
    assert!(engine.tick(&snap(120, 7.0, 18.0)).is_empty());
    assert!(!engine.is_latched("r1"));
    assert!(engine.actuators().is_on("pump"));

    let off = engine.tick(&snap(180, 7.0, 12.0));
    assert_eq!(off.len(), 1);
    assert!(!off[0].state);
}

// ── Composite conditions ──────────────────────────────────────

#[test]
fn nested_condition_with_falling_thresholds() {
    let mut engine = RuleEngine::default();
    engine.upsert(cold_heater()).unwrap();
    let r = engine.get("heat").unwrap();
    assert_eq!(r.trigger_metric(), "waterTemp");
    assert!(r.rule().action.state);

    let on = engine.tick(&MetricSnapshot::new(0).with("waterTemp", 22.5).with("ph", 7.0));
    assert_eq!(on.len(), 1);
    assert_eq!(on[0].device, "heater");

    // Condition false but still inside [23, 25): stays on.
    assert!(engine
        .tick(&MetricSnapshot::new(60).with("waterTemp", 24.5).with("ph", 7.0))
        .is_empty());

    let off = engine.tick(&MetricSnapshot::new(120).with("waterTemp", 25.0).with("ph", 7.0));
    assert_eq!(off.len(), 1);
    assert!(!off[0].state);
}

#[test]
fn rejected_rules_leave_rule_set_untouched() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();

    let mut bad = ph_pump();
    bad.hysteresis.off = bad.hysteresis.on;
    assert_eq!(
        engine.upsert(bad),
        Err(Error::InvalidRule(RuleError::DegenerateHysteresis))
    );

    // The editor's JSON cannot even carry an empty composite...
    let json = r#"{ "id": "r1", "condition": { "op": "and", "clauses": [] },
                    "action": { "device": "pump", "state": true },
                    "hysteresis": { "on": 1, "off": 0 } }"#;
    assert!(serde_json::from_str::<Rule>(json).is_err());

    // ...and one built by hand is refused at upsert.
    let mut empty = ph_pump();
    empty.condition = Condition::Composite(Composite {
        op: LogicOp::And,
        clauses: Vec::new(),
    });
    assert_eq!(
        engine.upsert(empty),
        Err(Error::InvalidRule(RuleError::EmptyComposite))
    );

    assert_eq!(engine.len(), 1);
    assert_eq!(engine.get("r1").unwrap().rule(), &ph_pump());
}

#[test]
fn depth_limit_comes_from_config() {
    let mut engine = RuleEngine::new(EngineConfig {
        max_condition_depth: 1,
        ..EngineConfig::default()
    });
    assert_eq!(
        engine.upsert(cold_heater()),
        Err(Error::InvalidRule(RuleError::TooDeep { max: 1 }))
    );
    assert!(engine.upsert(ph_pump()).is_ok());
}

// ── Simulation ────────────────────────────────────────────────

#[test]
fn simulation_matches_live_run_and_leaves_state_alone() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();

    let history: Vec<MetricSnapshot> = [8.0, 7.7, 7.5, 7.5, 8.1, 7.9, 7.4]
        .into_iter()
        .enumerate()
        .map(|(i, v)| ph(i as u64 * 400, v))
        .collect();

    let simulated = engine.simulate("r1", Window::new(0, 10_000), &history).unwrap();
    assert!(engine.actuators().get("pump").is_some_and(|d| !d.state));

    let mut live = Vec::new();
    for snap in &history {
        live.extend(engine.tick(snap));
    }
    assert_eq!(simulated, live);
    assert_eq!(simulated.len(), 4);
}

#[test]
fn simulation_of_unknown_rule_or_inverted_window() {
    let mut engine = RuleEngine::default();
    engine.upsert(ph_pump()).unwrap();

    assert_eq!(
        engine.simulate("nope", Window::new(0, 10), &[]),
        Err(Error::RuleNotFound("nope".into()))
    );
    assert_eq!(
        engine.simulate("r1", Window::new(10, 0), &[]),
        Err(Error::InvalidWindow { from: 10, to: 0 })
    );
}

// ── Through the service ───────────────────────────────────────

#[test]
fn stuck_relay_only_affects_its_own_device() {
    use std::sync::Arc;

    use aquacore::app::commands::AppCommand;
    use aquacore::app::events::AppEvent;
    use aquacore::app::service::TankService;

    use crate::mock_hw::{MockActuators, RecordingSink, catalog};

    let mut svc = TankService::new(EngineConfig::default(), Arc::new(catalog())).unwrap();
    let mut sink = RecordingSink::new();
    svc.handle_command(AppCommand::UpsertRule(ph_pump()), &mut sink).unwrap();
    svc.handle_command(AppCommand::UpsertRule(cold_heater()), &mut sink).unwrap();

    let mut hw = MockActuators::with_broken("heater");
    let snap = MetricSnapshot::new(0).with("ph", 8.2).with("waterTemp", 21.0);
    let applied = svc.tick(&snap, &mut hw, &mut sink);

    assert_eq!(applied.len(), 1);
    assert!(hw.is_on("pump"));
    assert!(!hw.is_on("heater"));
    assert!(hw.calls_for("heater").is_empty());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ActuatorFailed { change, .. } if change.device == "heater"
    )));
    assert!(sink.warnings().is_empty(), "no species selected");
}
