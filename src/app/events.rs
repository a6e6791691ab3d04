//! Outbound application events.
//!
//! The [`ControlLoop`](super::control_loop::ControlLoop) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use serde::Serialize;

use crate::error::{ActuatorError, SensorError};

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has been armed; the first tick follows after `first_delay_ms`.
    Started { first_delay_ms: u64, period_ms: u64 },

    /// The active zone changed.
    ZoneChanged {
        from: usize,
        to: usize,
        level: u8,
        temperature_c: i32,
    },

    /// The temperature reached the ceiling and the fan was handed back.
    Relinquished { temperature_c: i32, ceiling_c: i32 },

    /// Manual control resumed after a relinquished period.
    ControlResumed { zone: usize, level: u8 },

    /// The temperature read failed; the tick was skipped.
    SensorFault(SensorError),

    /// An actuator call failed.
    ActuatorFault(ActuatorError),
}

/// A point-in-time snapshot suitable for logging or printing as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Telemetry {
    pub ticks: u64,
    /// Last successfully read temperature.
    pub temperature_c: Option<i32>,
    pub zone: usize,
    /// Level last requested from the fan, `None` while relinquished or
    /// before the first controllable tick.
    pub level: Option<u8>,
    pub relinquished: bool,
    pub sensor_failures: u64,
    pub actuator_failures: u64,
}
