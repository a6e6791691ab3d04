//! One control tick: read → select → actuate.
//!
//! ```text
//!  TemperatureSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                        │       ControlLoop        │
//!      ActuatorSink ◀─── │  ZoneTable · Selector    │
//!                        │  ControlState (owned)    │
//!                        └──────────────────────────┘
//! ```
//!
//! The loop owns the previous-zone state outright.  It is moved from one
//! armed tick into the next by the [`FanService`](super::service::FanService),
//! so no lock is needed.
//!
//! ## Failure handling
//!
//! - Sensor failure: logged, no actuator call, state untouched.  The fan
//!   keeps whatever level it was last given.
//! - Actuator failure: logged, the zone state still advances.  The next
//!   successful tick brings the fan back in line.

use log::{debug, info, warn};

use crate::config::ControllerConfig;
use crate::control::{Selection, ZoneSelector, ZoneTable};
use crate::error::{ActuatorError, ConfigError, SensorError};

use super::events::{AppEvent, Telemetry};
use super::ports::{ActuatorSink, EventSink, TemperatureSource};

/// Hysteresis state carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    /// Zone chosen on the last controllable tick.
    pub previous_zone: usize,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// `set_level` succeeded.
    Actuated { zone: usize, level: u8, held: bool },
    /// `release` was issued this tick.
    Relinquished,
    /// Still above the ceiling; the fan was already released.
    StillRelinquished,
    SensorFailed(SensorError),
    ActuatorFailed(ActuatorError),
}

pub struct ControlLoop<S, A, E> {
    table: ZoneTable,
    selector: ZoneSelector,
    state: ControlState,
    source: S,
    sink: A,
    events: E,
    relinquished: bool,
    telemetry: Telemetry,
}

impl<S, A, E> ControlLoop<S, A, E>
where
    S: TemperatureSource,
    A: ActuatorSink,
    E: EventSink,
{
    pub fn new(table: ZoneTable, selector: ZoneSelector, source: S, sink: A, events: E) -> Self {
        Self {
            table,
            selector,
            state: ControlState::default(),
            source,
            sink,
            events,
            relinquished: false,
            telemetry: Telemetry::default(),
        }
    }

    /// Validate `config` and build a loop from it.
    pub fn from_config(
        config: &ControllerConfig,
        source: S,
        sink: A,
        events: E,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.zone_table()?,
            config.selector(),
            source,
            sink,
            events,
        ))
    }

    /// Run one control cycle.
    pub fn tick(&mut self) -> TickOutcome {
        self.telemetry.ticks += 1;

        let temp_c = match self.source.read() {
            Ok(t) => t,
            Err(e) => {
                warn!("ControlLoop: sensor read failed ({}), keeping last level", e);
                self.telemetry.sensor_failures += 1;
                self.events.emit(&AppEvent::SensorFault(e));
                return TickOutcome::SensorFailed(e);
            }
        };
        self.telemetry.temperature_c = Some(temp_c);

        match self
            .selector
            .select(&self.table, temp_c, self.state.previous_zone)
        {
            Selection::Relinquish => self.relinquish(temp_c),
            Selection::Zone { index, level, held } => self.actuate(temp_c, index, level, held),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_relinquished(&self) -> bool {
        self.relinquished
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            zone: self.state.previous_zone,
            relinquished: self.relinquished,
            ..self.telemetry
        }
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    // ── Internal ──────────────────────────────────────────────

    fn relinquish(&mut self, temp_c: i32) -> TickOutcome {
        if self.relinquished {
            debug!("ControlLoop: {}C still at/above ceiling", temp_c);
            return TickOutcome::StillRelinquished;
        }

        let ceiling_c = self.table.ceiling_threshold();
        match self.sink.release(ceiling_c) {
            Ok(()) => {
                info!(
                    "ControlLoop: {}C >= {}C ceiling, fan returned to firmware control",
                    temp_c, ceiling_c
                );
                self.relinquished = true;
                self.telemetry.level = None;
                self.events.emit(&AppEvent::Relinquished {
                    temperature_c: temp_c,
                    ceiling_c,
                });
                TickOutcome::Relinquished
            }
            Err(e) => self.actuator_failed(e),
        }
    }

    fn actuate(&mut self, temp_c: i32, zone: usize, level: u8, held: bool) -> TickOutcome {
        let result = self.sink.set_level(level, self.table.ceiling_threshold());

        let previous = self.state.previous_zone;
        if zone != previous {
            info!(
                "ControlLoop: {}C zone {} -> {} (level {})",
                temp_c, previous, zone, level
            );
            self.events.emit(&AppEvent::ZoneChanged {
                from: previous,
                to: zone,
                level,
                temperature_c: temp_c,
            });
            self.state.previous_zone = zone;
        } else if held {
            debug!(
                "ControlLoop: {}C holding zone {} within {}C hysteresis",
                temp_c,
                zone,
                self.selector.margin()
            );
        }

        // A failed call may still have put the fan back in manual mode, so
        // the next crossing of the ceiling must release again.
        let was_relinquished = core::mem::replace(&mut self.relinquished, false);

        if let Err(e) = result {
            return self.actuator_failed(e);
        }

        if was_relinquished {
            info!("ControlLoop: below ceiling again, manual control resumed");
            self.events.emit(&AppEvent::ControlResumed { zone, level });
        }
        self.telemetry.level = Some(level);
        TickOutcome::Actuated { zone, level, held }
    }

    fn actuator_failed(&mut self, e: ActuatorError) -> TickOutcome {
        warn!("ControlLoop: actuator call failed ({})", e);
        self.telemetry.actuator_failures += 1;
        self.events.emit(&AppEvent::ActuatorFault(e));
        TickOutcome::ActuatorFailed(e)
    }
}
