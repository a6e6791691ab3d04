//! Simulated thermal plant for running without ACPI.
//!
//! A first-order model: each step moves the temperature a fixed fraction
//! of the way toward the equilibrium set by the heat load and the current
//! fan speed.  The sensor and fan adapters share one [`SimPlant`] through
//! a [`SharedPlant`] handle, which also lets tests inject faults after the
//! adapters have been moved into the control loop.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::app::ports::{ActuatorSink, TemperatureSource};
use crate::drivers::ec_fan::FanMode;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::thermal::SensorEncoding;

/// Fan speed the firmware uses while it owns the fan.
const AUTOMATIC_FAN_FRACTION: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParams {
    /// Temperature with no load and no fan.
    pub ambient_c: f32,
    /// Heating above ambient with the fan stopped.
    pub load_c: f32,
    /// Cooling at full fan speed.
    pub cooling_c: f32,
    /// Fraction of the gap to equilibrium closed per step, in (0, 1].
    pub rate: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            ambient_c: 30.0,
            load_c: 55.0,
            cooling_c: 40.0,
            rate: 0.3,
        }
    }
}

#[derive(Debug)]
pub struct SimPlant {
    params: PlantParams,
    temperature_c: f32,
    fan: FanMode,
    limit_c: Option<i32>,
    sensor_faults: u32,
    fan_faults: u32,
}

pub type SharedPlant = Arc<Mutex<SimPlant>>;

impl SimPlant {
    pub fn new(params: PlantParams, initial_c: f32) -> Self {
        Self {
            params,
            temperature_c: initial_c,
            fan: FanMode::Automatic,
            limit_c: None,
            sensor_faults: 0,
            fan_faults: 0,
        }
    }

    pub fn shared(self) -> SharedPlant {
        Arc::new(Mutex::new(self))
    }

    pub fn temperature(&self) -> f32 {
        self.temperature_c
    }

    pub fn fan_mode(&self) -> FanMode {
        self.fan
    }

    /// Ceiling last registered by the fan adapter.
    pub fn limit(&self) -> Option<i32> {
        self.limit_c
    }

    /// Fail the next `n` sensor reads.
    pub fn fail_sensor_reads(&mut self, n: u32) {
        self.sensor_faults = n;
    }

    /// Fail the next `n` fan commands.
    pub fn fail_fan_commands(&mut self, n: u32) {
        self.fan_faults = n;
    }

    /// Temperature the plant settles at with the current fan setting.
    pub fn equilibrium(&self) -> f32 {
        let p = &self.params;
        p.ambient_c + p.load_c - p.cooling_c * self.fan_fraction()
    }

    /// Advance the model by one step.
    pub fn step(&mut self) {
        let target = self.equilibrium();
        self.temperature_c += self.params.rate * (target - self.temperature_c);
    }

    fn fan_fraction(&self) -> f32 {
        match self.fan {
            FanMode::Automatic => AUTOMATIC_FAN_FRACTION,
            FanMode::Manual { level } => f32::from(level) / f32::from(u8::MAX),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor
// ───────────────────────────────────────────────────────────────

/// Reads the plant through the same raw encoding the firmware uses.
/// Every read advances the plant by one step.
pub struct SimThermalSensor {
    plant: SharedPlant,
    encoding: SensorEncoding,
}

impl SimThermalSensor {
    pub fn new(plant: SharedPlant, encoding: SensorEncoding) -> Self {
        Self { plant, encoding }
    }
}

impl TemperatureSource for SimThermalSensor {
    fn read(&mut self) -> Result<i32, SensorError> {
        let mut plant = self.plant.lock().map_err(|_| SensorError::Unavailable)?;
        plant.step();
        if plant.sensor_faults > 0 {
            plant.sensor_faults -= 1;
            return Err(SensorError::ReadFailed);
        }

        #[allow(clippy::cast_possible_truncation)]
        let celsius = plant.temperature_c.round() as i32;
        let raw = self.encoding.from_celsius(celsius);
        debug!("Sim: plant at {:.1}C, raw {}", plant.temperature_c, raw);
        self.encoding.to_celsius(raw)
    }
}

// ───────────────────────────────────────────────────────────────
// Fan
// ───────────────────────────────────────────────────────────────

pub struct SimFan {
    plant: SharedPlant,
}

impl SimFan {
    pub fn new(plant: SharedPlant) -> Self {
        Self { plant }
    }

    fn command(&mut self, ceiling_c: i32, fan: FanMode) -> Result<(), ActuatorError> {
        let mut plant = self.plant.lock().map_err(|_| ActuatorError::Unavailable)?;
        if plant.fan_faults > 0 {
            plant.fan_faults -= 1;
            return Err(ActuatorError::WriteFailed);
        }
        plant.limit_c = Some(ceiling_c);
        plant.fan = fan;
        Ok(())
    }
}

impl ActuatorSink for SimFan {
    fn set_level(&mut self, level: u8, ceiling_c: i32) -> Result<(), ActuatorError> {
        self.command(ceiling_c, FanMode::Manual { level })
    }

    fn release(&mut self, ceiling_c: i32) -> Result<(), ActuatorError> {
        self.command(ceiling_c, FanMode::Automatic)
    }
}
