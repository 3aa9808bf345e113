//! End-to-end controller scenarios driven through the command surface.

use climate_common::{
    ClimateAction, ClimateConfig, ClimateEngine, ClimateMode, DeviceConfig, EngineOutput,
    InputEvent, MemoryCheckpoint, RuntimeConfig, StatusSink, TransportConfig,
};
use pretty_assertions::assert_eq;
use serde_json::json;

struct Discard;

impl StatusSink for Discard {
    type Error = std::convert::Infallible;

    fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
}

type Engine = ClimateEngine<MemoryCheckpoint, Discard>;

fn runtime(climate: ClimateConfig) -> RuntimeConfig {
    RuntimeConfig {
        device: DeviceConfig {
            id: "hall".to_string(),
            name: "Hallway".to_string(),
        },
        climate,
        transport: TransportConfig {
            advertise: false,
            ..TransportConfig::default()
        },
    }
}

fn heat_only() -> ClimateConfig {
    ClimateConfig {
        has_heating: true,
        has_cooling: false,
        tolerance: 0.2,
        min_temp: 5.0,
        max_temp: 25.0,
        default_heat_setpoint: 18.0,
        default_cool_setpoint: 24.0,
        cycle_delay_ms: 1_000,
        keep_alive_ms: 10_000,
        swap_delay_ms: 5_000,
        startup_grace_ms: 0,
        ..ClimateConfig::default()
    }
}

fn dual() -> ClimateConfig {
    ClimateConfig {
        tolerance: 0.5,
        startup_grace_ms: 0,
        ..ClimateConfig::default()
    }
}

fn send(engine: &mut Engine, event: serde_json::Value, now_ms: u64) -> Vec<EngineOutput> {
    let input: InputEvent = serde_json::from_value(event).unwrap();
    input
        .commands()
        .into_iter()
        .flat_map(|command| engine.apply(command, now_ms))
        .collect()
}

#[test]
fn heat_only_controller_follows_temperature() {
    let mut engine = Engine::new(&runtime(heat_only()), MemoryCheckpoint::new(), None, 0).unwrap();

    send(&mut engine, json!({ "payload": "heat" }), 0);
    assert_eq!(engine.mode(), ClimateMode::Heat);

    send(&mut engine, json!({ "temperature": 16.0 }), 100);
    engine.tick(1_000);
    assert_eq!(engine.action(), ClimateAction::Heating);

    // The 2.5° swing only registers after the swap delay.
    send(&mut engine, json!({ "temperature": 18.5 }), 2_000);
    engine.tick(3_000);
    assert_eq!(engine.current_temp(), Some(16.0));
    assert_eq!(engine.action(), ClimateAction::Heating);

    send(&mut engine, json!({ "temperature": 18.5 }), 5_101);
    engine.tick(6_000);
    assert_eq!(engine.current_temp(), Some(18.5));
    assert_eq!(engine.action(), ClimateAction::None);
}

#[test]
fn mode_off_stops_heating_immediately() {
    let mut engine = Engine::new(&runtime(heat_only()), MemoryCheckpoint::new(), None, 0).unwrap();
    send(&mut engine, json!({ "temperature": 10.0, "setpoint": 20 }), 0);
    engine.tick(1_000);
    assert_eq!(engine.action(), ClimateAction::Heating);

    let outputs = send(&mut engine, json!({ "mode": "off" }), 1_200);

    assert_eq!(engine.action(), ClimateAction::None);
    assert_eq!(engine.setpoint(1_200), None);
    assert!(!engine.is_override_active());
    let Some(EngineOutput::Update(update)) = outputs.first() else {
        panic!("expected an update, got {outputs:?}");
    };
    assert_eq!(update.mode, ClimateMode::Off);
    assert_eq!(update.action, ClimateAction::None);
    assert_eq!(update.temperature, Some(10.0));
}

#[test]
fn switching_heat_to_cool_resets_run_timestamps() {
    let mut engine = Engine::new(&runtime(dual()), MemoryCheckpoint::new(), None, 0).unwrap();
    assert_eq!(engine.mode(), ClimateMode::Auto);

    send(&mut engine, json!({ "mode": "heat", "temperature": 12.0 }), 0);
    engine.tick(1_000);
    assert_eq!(engine.run_timers().last_heat_ms(), Some(1_000));

    send(&mut engine, json!({ "mode": "cool" }), 2_000);

    assert_eq!(engine.mode(), ClimateMode::Cool);
    assert_eq!(engine.run_timers().last_heat_ms(), None);
    assert_eq!(engine.run_timers().last_cool_ms(), None);
}

#[test]
fn out_of_range_setpoint_never_changes_target() {
    let mut engine = Engine::new(&runtime(heat_only()), MemoryCheckpoint::new(), None, 0).unwrap();
    send(&mut engine, json!({ "setpoint": 21.5 }), 0);
    assert_eq!(engine.target_temp(0), 21.5);

    for value in [json!(4.0), json!(26), json!("NaN"), json!("abc"), json!(true)] {
        send(&mut engine, json!({ "setpoint": value }), 10);
        assert_eq!(engine.target_temp(10), 21.5);
    }
}

#[test]
fn action_requests_respect_capabilities() {
    let mut engine = Engine::new(&runtime(heat_only()), MemoryCheckpoint::new(), None, 0).unwrap();

    let outputs = send(&mut engine, json!({ "action": "cooling" }), 0);
    assert!(outputs.is_empty());
    assert_eq!(engine.mode(), ClimateMode::Heat);

    send(&mut engine, json!({ "mode": "off" }), 10);
    send(&mut engine, json!({ "action": "heating" }), 20);
    assert_eq!(engine.mode(), ClimateMode::Heat);
}

#[test]
fn checkpointed_rails_survive_restart() {
    let runtime = runtime(dual());
    let mut engine = Engine::new(&runtime, MemoryCheckpoint::new(), None, 0).unwrap();
    send(
        &mut engine,
        json!({ "heatSetpoint": 19.5, "coolSetpoint": "26" }),
        0,
    );

    let checkpoint = engine.checkpoint().clone();
    let restarted = Engine::new(&runtime, checkpoint, None, 0).unwrap();

    assert_eq!(restarted.heat_setpoint(), 19.5);
    assert_eq!(restarted.cool_setpoint(), 26.0);
}
