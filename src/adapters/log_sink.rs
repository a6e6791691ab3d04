//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as a single
//! log line.  The binary routes these through `tracing-subscriber`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                first_delay_ms,
                period_ms,
            } => {
                info!(
                    "START | first_tick={}ms period={}ms",
                    first_delay_ms, period_ms
                );
            }
            AppEvent::ZoneChanged {
                from,
                to,
                level,
                temperature_c,
            } => {
                info!(
                    "ZONE  | {} -> {} | T={}\u{00b0}C | level={}",
                    from, to, temperature_c, level
                );
            }
            AppEvent::Relinquished {
                temperature_c,
                ceiling_c,
            } => {
                info!(
                    "AUTO  | T={}\u{00b0}C >= ceiling {}\u{00b0}C, firmware in control",
                    temperature_c, ceiling_c
                );
            }
            AppEvent::ControlResumed { zone, level } => {
                info!("MANUAL| resumed in zone {} at level {}", zone, level);
            }
            AppEvent::SensorFault(e) => warn!("FAULT | sensor: {}", e),
            AppEvent::ActuatorFault(e) => warn!("FAULT | actuator: {}", e),
        }
    }
}
