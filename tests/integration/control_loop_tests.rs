//! Control loop scenarios against the reference zone table.

use zonefan::app::control_loop::{ControlLoop, TickOutcome};
use zonefan::app::events::AppEvent;
use zonefan::config::ControllerConfig;
use zonefan::control::ZoneEntry;
use zonefan::error::{ActuatorError, SensorError};

use crate::mock_hw::{EventLog, FanCall, MockFan, ScriptedSensor};

type Loop = ControlLoop<ScriptedSensor, MockFan, EventLog>;

fn make_loop(sensor: &ScriptedSensor) -> (Loop, MockFan, EventLog) {
    let fan = MockFan::new();
    let events = EventLog::new();
    let control = ControlLoop::from_config(
        &ControllerConfig::default(),
        sensor.clone(),
        fan.clone(),
        events.clone(),
    )
    .unwrap();
    (control, fan, events)
}

fn set(level: u8) -> FanCall {
    FanCall::SetLevel {
        level,
        ceiling_c: 75,
    }
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn seventy_two_selects_zone_two() {
    let sensor = ScriptedSensor::temps(&[72]);
    let (mut c, fan, _) = make_loop(&sensor);
    c.tick();
    assert_eq!(c.state().previous_zone, 2);
    assert_eq!(fan.calls(), vec![set(140)]);
}

#[test]
fn seventy_six_relinquishes_without_set_level() {
    let sensor = ScriptedSensor::temps(&[76]);
    let (mut c, fan, events) = make_loop(&sensor);
    assert_eq!(c.tick(), TickOutcome::Relinquished);
    assert_eq!(fan.calls(), vec![FanCall::Release { ceiling_c: 75 }]);
    assert_eq!(
        events.events(),
        vec![AppEvent::Relinquished {
            temperature_c: 76,
            ceiling_c: 75
        }]
    );
}

#[test]
fn small_drop_is_held_by_hysteresis() {
    let sensor = ScriptedSensor::temps(&[68, 64]);
    let (mut c, fan, _) = make_loop(&sensor);
    c.tick();
    c.tick();
    assert_eq!(c.state().previous_zone, 2);
    assert_eq!(fan.calls(), vec![set(140), set(140)]);
}

#[test]
fn drop_to_sixty_lands_in_zone_one() {
    // 60 is not below the first threshold, so the raw zone is 1 and
    // 60 <= 65 - 3 lets the loop step down to it.
    let sensor = ScriptedSensor::temps(&[68, 60]);
    let (mut c, fan, _) = make_loop(&sensor);
    c.tick();
    c.tick();
    assert_eq!(c.state().previous_zone, 1);
    assert_eq!(fan.last_call(), Some(set(120)));
}

#[test]
fn drop_below_first_threshold_lands_in_zone_zero() {
    let sensor = ScriptedSensor::temps(&[68, 56]);
    let (mut c, fan, _) = make_loop(&sensor);
    c.tick();
    c.tick();
    assert_eq!(c.state().previous_zone, 0);
    assert_eq!(fan.last_call(), Some(set(100)));
}

#[test]
fn rising_temperature_climbs_immediately() {
    let sensor = ScriptedSensor::temps(&[55, 61, 66, 71]);
    let (mut c, fan, events) = make_loop(&sensor);
    for _ in 0..4 {
        c.tick();
    }
    assert_eq!(fan.calls(), vec![set(100), set(120), set(140), set(140)]);
    // The loop starts in zone 0, so 55 is not a change.
    assert_eq!(
        events.count(|e| matches!(e, AppEvent::ZoneChanged { .. })),
        2
    );
}

#[test]
fn full_heat_cycle() {
    let sensor = ScriptedSensor::temps(&[62, 70, 78, 80, 73, 66, 61, 55]);
    let (mut c, fan, events) = make_loop(&sensor);
    let outcomes: Vec<_> = (0..8).map(|_| c.tick()).collect();

    assert_eq!(outcomes[2], TickOutcome::Relinquished);
    assert_eq!(outcomes[3], TickOutcome::StillRelinquished);
    assert_eq!(
        fan.calls(),
        vec![
            set(120),
            set(140),
            FanCall::Release { ceiling_c: 75 },
            set(140),
            // 66 is still below the zone 2 threshold.
            set(140),
            // 61 <= 62: step down to zone 1.
            set(120),
            set(100),
        ]
    );
    assert_eq!(
        events.count(|e| matches!(e, AppEvent::ControlResumed { zone: 2, level: 140 })),
        1
    );
    assert!(!c.is_relinquished());
}

// ── Fail-safe ─────────────────────────────────────────────────

#[test]
fn sensor_failure_keeps_last_level() {
    let sensor = ScriptedSensor::new(&[Ok(72), Err(SensorError::ReadFailed)]);
    let (mut c, fan, events) = make_loop(&sensor);
    c.tick();
    for _ in 0..3 {
        assert_eq!(c.tick(), TickOutcome::SensorFailed(SensorError::ReadFailed));
    }
    assert_eq!(fan.calls(), vec![set(140)]);
    assert_eq!(c.telemetry().sensor_failures, 3);
    assert_eq!(c.telemetry().level, Some(140));
    assert_eq!(
        events.count(|e| matches!(e, AppEvent::SensorFault(_))),
        3
    );
}

#[test]
fn sensor_recovers_after_failure() {
    let sensor = ScriptedSensor::new(&[Err(SensorError::Malformed), Ok(66)]);
    let (mut c, fan, _) = make_loop(&sensor);
    assert!(matches!(c.tick(), TickOutcome::SensorFailed(_)));
    assert_eq!(
        c.tick(),
        TickOutcome::Actuated {
            zone: 2,
            level: 140,
            held: false
        }
    );
    assert_eq!(fan.calls(), vec![set(140)]);
}

#[test]
fn actuator_failure_is_retried_next_tick() {
    let sensor = ScriptedSensor::temps(&[72, 72]);
    let (mut c, fan, events) = make_loop(&sensor);
    fan.fail_with(&[ActuatorError::WriteFailed]);

    assert_eq!(
        c.tick(),
        TickOutcome::ActuatorFailed(ActuatorError::WriteFailed)
    );
    assert!(matches!(c.tick(), TickOutcome::Actuated { level: 140, .. }));
    assert_eq!(fan.calls(), vec![set(140), set(140)]);
    assert_eq!(
        events.count(|e| *e == AppEvent::ActuatorFault(ActuatorError::WriteFailed)),
        1
    );
}

// ── Custom tables ─────────────────────────────────────────────

#[test]
fn two_zone_table_has_single_controllable_zone() {
    let mut config = ControllerConfig::default();
    config
        .set_zones(&[ZoneEntry::new(50, 80), ZoneEntry::new(70, 255)])
        .unwrap();
    let sensor = ScriptedSensor::temps(&[20, 69, 70]);
    let fan = MockFan::new();
    let mut c =
        ControlLoop::from_config(&config, sensor, fan.clone(), EventLog::new()).unwrap();
    for _ in 0..3 {
        c.tick();
    }
    assert_eq!(
        fan.calls(),
        vec![
            FanCall::SetLevel { level: 80, ceiling_c: 70 },
            FanCall::SetLevel { level: 80, ceiling_c: 70 },
            FanCall::Release { ceiling_c: 70 },
        ]
    );
}
