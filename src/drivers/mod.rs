//! Fan actuator drivers.

pub mod ec_fan;
