//! Control loop driving the ACPI sensor and EC fan drivers over a fake
//! firmware bus, checking the exact method calls that reach firmware.

use std::sync::{Arc, Mutex};

use zonefan::adapters::acpi_call::{AcpiBus, AcpiError};
use zonefan::adapters::log_sink::LogEventSink;
use zonefan::app::control_loop::{ControlLoop, TickOutcome};
use zonefan::config::ControllerConfig;
use zonefan::drivers::ec_fan::{EC_READ_WRITE, EC_TEMP_LIMIT, EcFanDriver, ecrw_word};
use zonefan::error::{ActuatorError, SensorError};
use zonefan::sensors::thermal_zone::{THERMAL_ZONE_TMP, ThermalZoneSensor};

#[derive(Default)]
struct FirmwareState {
    /// `_TMP` result in tenths of a Kelvin.
    tmp: Option<u64>,
    calls: Vec<(String, Vec<u64>)>,
    fail_method: Option<(&'static str, AcpiError)>,
}

#[derive(Clone, Default)]
struct FakeFirmware(Arc<Mutex<FirmwareState>>);

impl FakeFirmware {
    fn set_celsius(&self, c: i64) {
        self.0.lock().unwrap().tmp = Some((c * 10 + 2732) as u64);
    }

    /// Calls other than the temperature read.
    fn writes(&self) -> Vec<(String, Vec<u64>)> {
        self.0
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, _)| m != THERMAL_ZONE_TMP)
            .cloned()
            .collect()
    }

    fn clear(&self) {
        self.0.lock().unwrap().calls.clear();
    }
}

impl AcpiBus for FakeFirmware {
    fn evaluate(&mut self, method: &str, args: &[u64]) -> Result<Option<u64>, AcpiError> {
        let mut s = self.0.lock().unwrap();
        s.calls.push((method.to_string(), args.to_vec()));
        if let Some((m, e)) = s.fail_method {
            if m == method {
                return Err(e);
            }
        }
        if method == THERMAL_ZONE_TMP {
            return Ok(s.tmp);
        }
        Ok(Some(0))
    }
}

fn make_loop(
    fw: &FakeFirmware,
) -> ControlLoop<ThermalZoneSensor<FakeFirmware>, EcFanDriver<FakeFirmware>, LogEventSink> {
    let config = ControllerConfig::default();
    ControlLoop::from_config(
        &config,
        ThermalZoneSensor::new(fw.clone(), config.sensor),
        EcFanDriver::new(fw.clone()),
        LogEventSink::new(),
    )
    .unwrap()
}

fn call(method: &str, args: &[u64]) -> (String, Vec<u64>) {
    (method.to_string(), args.to_vec())
}

#[test]
fn controllable_tick_registers_ceiling_then_writes_level() {
    let fw = FakeFirmware::default();
    fw.set_celsius(72);
    let mut c = make_loop(&fw);
    c.tick();
    assert_eq!(
        fw.writes(),
        vec![
            call(EC_TEMP_LIMIT, &[75, 0]),
            call(EC_READ_WRITE, &[ecrw_word(140)]),
        ]
    );
    assert_eq!(ecrw_word(140), 0x0084_8CC4);
}

#[test]
fn over_ceiling_only_registers_limit() {
    let fw = FakeFirmware::default();
    fw.set_celsius(80);
    let mut c = make_loop(&fw);
    assert_eq!(c.tick(), TickOutcome::Relinquished);
    assert_eq!(fw.writes(), vec![call(EC_TEMP_LIMIT, &[75, 0])]);

    fw.clear();
    assert_eq!(c.tick(), TickOutcome::StillRelinquished);
    assert!(fw.writes().is_empty());
}

#[test]
fn missing_temperature_value_is_a_sensor_fault() {
    let fw = FakeFirmware::default();
    let mut c = make_loop(&fw);
    assert_eq!(c.tick(), TickOutcome::SensorFailed(SensorError::Malformed));
    assert!(fw.writes().is_empty());
}

#[test]
fn failing_temperature_method_is_a_sensor_fault() {
    let fw = FakeFirmware::default();
    fw.set_celsius(65);
    fw.0.lock().unwrap().fail_method = Some((THERMAL_ZONE_TMP, AcpiError::MethodFailed));
    let mut c = make_loop(&fw);
    assert_eq!(c.tick(), TickOutcome::SensorFailed(SensorError::ReadFailed));
}

#[test]
fn rejected_limit_still_writes_level() {
    let fw = FakeFirmware::default();
    fw.set_celsius(66);
    fw.0.lock().unwrap().fail_method = Some((EC_TEMP_LIMIT, AcpiError::MethodFailed));
    let mut c = make_loop(&fw);
    assert_eq!(
        c.tick(),
        TickOutcome::ActuatorFailed(ActuatorError::LimitRejected)
    );
    assert_eq!(
        fw.writes().last(),
        Some(&call(EC_READ_WRITE, &[ecrw_word(140)]))
    );
    assert_eq!(c.state().previous_zone, 2);
}

#[test]
fn failed_limit_after_release_releases_again_above_ceiling() {
    let fw = FakeFirmware::default();
    let mut c = make_loop(&fw);

    fw.set_celsius(76);
    assert_eq!(c.tick(), TickOutcome::Relinquished);

    // The level write still lands, so the fan is back in manual mode.
    fw.0.lock().unwrap().fail_method = Some((EC_TEMP_LIMIT, AcpiError::MethodFailed));
    fw.set_celsius(72);
    assert_eq!(
        c.tick(),
        TickOutcome::ActuatorFailed(ActuatorError::LimitRejected)
    );
    assert_eq!(
        fw.writes().last(),
        Some(&call(EC_READ_WRITE, &[ecrw_word(140)]))
    );

    fw.0.lock().unwrap().fail_method = None;
    fw.clear();
    fw.set_celsius(80);
    assert_eq!(c.tick(), TickOutcome::Relinquished);
    assert_eq!(fw.writes(), vec![call(EC_TEMP_LIMIT, &[75, 0])]);
}
