//! Raw thermal-zone encoding.
//!
//! ACPI thermal zones report temperature in tenths of a Kelvin.  The
//! controller works in whole degrees Celsius:
//!
//! ```text
//! celsius = (raw - offset) / scale      offset = 2732, scale = 10
//! ```
//!
//! Division truncates toward zero, so 3461 (72.9 C) reads as 72.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SensorError};

/// 0 C in tenths of a Kelvin, rounded the way the firmware rounds it.
pub const DECI_KELVIN_OFFSET: i32 = 2732;
pub const DECI_KELVIN_SCALE: i32 = 10;

/// Linear transform from raw sensor units to degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEncoding {
    pub offset: i32,
    pub scale: i32,
}

impl Default for SensorEncoding {
    fn default() -> Self {
        Self::DECI_KELVIN
    }
}

impl SensorEncoding {
    pub const DECI_KELVIN: Self = Self {
        offset: DECI_KELVIN_OFFSET,
        scale: DECI_KELVIN_SCALE,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale <= 0 {
            return Err(ConfigError::InvalidSensorScale(self.scale));
        }
        Ok(())
    }

    /// Convert a raw reading to whole degrees Celsius.
    ///
    /// Raw values that do not fit the working range are reported as
    /// [`SensorError::Malformed`] rather than wrapped.
    pub fn to_celsius(&self, raw: u64) -> Result<i32, SensorError> {
        let raw = i64::try_from(raw).map_err(|_| SensorError::Malformed)?;
        let celsius = (raw - i64::from(self.offset)) / i64::from(self.scale);
        i32::try_from(celsius).map_err(|_| SensorError::Malformed)
    }

    /// Inverse of [`to_celsius`](Self::to_celsius), used by the simulator.
    pub fn from_celsius(&self, celsius: i32) -> u64 {
        let raw = i64::from(celsius) * i64::from(self.scale) + i64::from(self.offset);
        raw.max(0) as u64
    }
}
