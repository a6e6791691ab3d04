//! ACPI thermal zone temperature sensor.
//!
//! Evaluates `\_TZ.THRM._TMP`, which returns the zone temperature in
//! tenths of a Kelvin, and converts it with the configured
//! [`SensorEncoding`].

use crate::adapters::acpi_call::{AcpiBus, AcpiError};
use crate::error::SensorError;

use super::thermal::SensorEncoding;

/// Thermal zone temperature method on the A8J-class firmware.
pub const THERMAL_ZONE_TMP: &str = "\\_TZ.THRM._TMP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermalZoneReading {
    pub raw: u64,
    pub celsius: i32,
}

pub struct ThermalZoneSensor<B> {
    bus: B,
    encoding: SensorEncoding,
}

impl<B: AcpiBus> ThermalZoneSensor<B> {
    pub fn new(bus: B, encoding: SensorEncoding) -> Self {
        Self { bus, encoding }
    }

    pub fn read(&mut self) -> Result<ThermalZoneReading, SensorError> {
        let raw = self
            .bus
            .evaluate(THERMAL_ZONE_TMP, &[])
            .map_err(sensor_error)?
            .ok_or(SensorError::Malformed)?;
        let celsius = self.encoding.to_celsius(raw)?;
        Ok(ThermalZoneReading { raw, celsius })
    }
}

fn sensor_error(e: AcpiError) -> SensorError {
    match e {
        AcpiError::Unavailable => SensorError::Unavailable,
        AcpiError::Io | AcpiError::MethodFailed | AcpiError::NotCalled => SensorError::ReadFailed,
    }
}
