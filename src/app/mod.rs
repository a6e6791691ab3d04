//! Application core: zone control logic and its tick driver.
//!
//! The control loop talks to the outside world only through the **port
//! traits** in [`ports`], so every rule here is testable without ACPI.

pub mod control_loop;
pub mod events;
pub mod ports;
pub mod service;
