//! Controller configuration parameters
//!
//! All tunable parameters for the fan controller.  Defaults are the
//! reference values for the A8J-class EC fan; individual values can be
//! overridden from the command line.

use core::time::Duration;

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::control::hysteresis::DEFAULT_HYSTERESIS_C;
use crate::control::zones::{MAX_ZONES, ZoneEntry, ZoneTable, reference_rows};
use crate::control::ZoneSelector;
use crate::error::ConfigError;
use crate::sensors::thermal::SensorEncoding;

/// Reference steady-state tick period.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 10_000;
/// Reference delay before the first tick after start.
pub const DEFAULT_FIRST_TICK_DELAY_MS: u32 = 1_000;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Zones ---
    /// Ordered `(threshold, level)` rows; the last threshold is the ceiling.
    pub zones: Vec<ZoneEntry, MAX_ZONES>,
    /// Degrees below a cooler zone's threshold the temperature must fall
    /// before stepping down into it.
    pub hysteresis_c: i32,

    // --- Timing ---
    /// Steady-state tick period (milliseconds)
    pub tick_period_ms: u32,
    /// Delay before the first tick after start (milliseconds)
    pub first_tick_delay_ms: u32,

    // --- Sensor ---
    /// Raw-to-Celsius transform of the thermal zone.
    pub sensor: SensorEncoding,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            zones: reference_rows(),
            hysteresis_c: DEFAULT_HYSTERESIS_C,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            first_tick_delay_ms: DEFAULT_FIRST_TICK_DELAY_MS,
            sensor: SensorEncoding::DECI_KELVIN,
        }
    }
}

impl ControllerConfig {
    /// Check every field.  A failure here means the loop must not start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ZoneTable::new(&self.zones)?;
        if self.hysteresis_c < 0 {
            return Err(ConfigError::NegativeHysteresis(self.hysteresis_c));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroInterval("tick period"));
        }
        if self.first_tick_delay_ms == 0 {
            return Err(ConfigError::ZeroInterval("first tick delay"));
        }
        if self.first_tick_delay_ms > self.tick_period_ms {
            return Err(ConfigError::FirstDelayTooLong);
        }
        self.sensor.validate()
    }

    /// Build the validated zone table.
    pub fn zone_table(&self) -> Result<ZoneTable, ConfigError> {
        ZoneTable::new(&self.zones)
    }

    pub fn selector(&self) -> ZoneSelector {
        ZoneSelector::new(self.hysteresis_c)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_period_ms))
    }

    pub fn first_tick_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.first_tick_delay_ms))
    }

    /// Replace the zone rows.  Fails only if there are more than
    /// [`MAX_ZONES`]; ordering is checked by [`validate`](Self::validate).
    pub fn set_zones(&mut self, zones: &[ZoneEntry]) -> Result<(), ConfigError> {
        self.zones = Vec::from_slice(zones).map_err(|()| ConfigError::TooManyZones(zones.len()))?;
        Ok(())
    }
}
