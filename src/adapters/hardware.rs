//! Hardware adapter: bridges the ACPI drivers to the domain port traits.
//!
//! [`ThermalZoneSensor`] becomes a [`TemperatureSource`] and
//! [`EcFanDriver`] an [`ActuatorSink`].  Firmware errors are folded into
//! the domain error types here and nowhere else.

use crate::adapters::acpi_call::{AcpiBus, AcpiError};
use crate::app::ports::{ActuatorSink, TemperatureSource};
use crate::drivers::ec_fan::{EcFanDriver, EcFanError};
use crate::error::{ActuatorError, SensorError};
use crate::sensors::thermal_zone::ThermalZoneSensor;

// ── TemperatureSource implementation ──────────────────────────

impl<B: AcpiBus> TemperatureSource for ThermalZoneSensor<B> {
    fn read(&mut self) -> Result<i32, SensorError> {
        ThermalZoneSensor::read(self).map(|r| r.celsius)
    }
}

// ── ActuatorSink implementation ───────────────────────────────

impl<B: AcpiBus> ActuatorSink for EcFanDriver<B> {
    fn set_level(&mut self, level: u8, ceiling_c: i32) -> Result<(), ActuatorError> {
        EcFanDriver::set_level(self, level, ceiling_c).map_err(actuator_error)
    }

    fn release(&mut self, ceiling_c: i32) -> Result<(), ActuatorError> {
        EcFanDriver::release(self, ceiling_c).map_err(actuator_error)
    }
}

fn actuator_error(e: EcFanError) -> ActuatorError {
    match e {
        EcFanError::Limit(AcpiError::Unavailable) | EcFanError::Write(AcpiError::Unavailable) => {
            ActuatorError::Unavailable
        }
        EcFanError::Limit(_) => ActuatorError::LimitRejected,
        EcFanError::Write(_) => ActuatorError::WriteFailed,
    }
}
