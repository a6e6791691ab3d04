//! Temperature sensing: raw encoding and the ACPI thermal zone reader.

pub mod thermal;
pub mod thermal_zone;
