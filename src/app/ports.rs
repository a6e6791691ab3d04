//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (thermal sensor, fan, event sinks) implement these
//! traits.  The [`ControlLoop`](super::control_loop::ControlLoop) consumes
//! them via generics, so the domain core never touches firmware directly.

use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Temperature source (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the loop calls this once per tick.
pub trait TemperatureSource {
    /// Current temperature in whole degrees Celsius.
    fn read(&mut self) -> Result<i32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator sink (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the loop makes at most one call per tick.
pub trait ActuatorSink {
    /// Drive the fan at `level` (0–255).  `ceiling_c` is the highest
    /// temperature manual control is supported at; it is registered with
    /// every call because the firmware can leave manual mode by itself.
    fn set_level(&mut self, level: u8, ceiling_c: i32) -> Result<(), ActuatorError>;

    /// Give the fan back to firmware-managed (automatic) control.
    fn release(&mut self, ceiling_c: i32) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

impl<T: TemperatureSource + ?Sized> TemperatureSource for Box<T> {
    fn read(&mut self) -> Result<i32, SensorError> {
        (**self).read()
    }
}

impl<T: ActuatorSink + ?Sized> ActuatorSink for Box<T> {
    fn set_level(&mut self, level: u8, ceiling_c: i32) -> Result<(), ActuatorError> {
        (**self).set_level(level, ceiling_c)
    }

    fn release(&mut self, ceiling_c: i32) -> Result<(), ActuatorError> {
        (**self).release(ceiling_c)
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}
