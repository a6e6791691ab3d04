//! Thermal-zone fan controller library.
//!
//! Exposes the control core, its ACPI and simulated adapters, and the
//! tick scheduler for the `zonefan` binary and integration tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod scheduler;
pub mod sensors;
