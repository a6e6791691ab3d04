//! Fan service: drives a [`ControlLoop`] from the delayed-work queue.
//!
//! ```text
//!  start() ──▶ arm(first_delay) ──▶ tick ──▶ arm(period) ──▶ tick ──▶ …
//!                                                   │
//!  shutdown() ── cancel token ── join worker ───────┘
//! ```
//!
//! The loop value is moved into each armed callback and handed on to the
//! next one, so exactly one tick can touch it at a time.  A telemetry
//! snapshot is mirrored after every tick for readers on other threads.

use core::cell::Cell;
use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, error, info};

use crate::config::ControllerConfig;
use crate::error::{self, SchedulerError};
use crate::scheduler::{DelayedWork, QueueHandle, WorkQueue};

use super::control_loop::ControlLoop;
use super::events::{AppEvent, Telemetry};
use super::ports::{ActuatorSink, EventSink, TemperatureSource};

/// Name of the tick worker thread.
pub const WORKER_NAME: &str = "zonefan-tick";

type TelemetryCell = Mutex<CriticalSectionRawMutex, Cell<Telemetry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

// ───────────────────────────────────────────────────────────────
// FanService
// ───────────────────────────────────────────────────────────────

pub struct FanService {
    queue: WorkQueue,
    work: Option<DelayedWork>,
    telemetry: Arc<TelemetryCell>,
}

impl FanService {
    /// Spawn the tick worker.  Nothing runs until [`start`](Self::start).
    pub fn new() -> Result<Self, SchedulerError> {
        Ok(Self {
            queue: WorkQueue::spawn(WORKER_NAME)?,
            work: None,
            telemetry: Arc::new(Mutex::new(Cell::new(Telemetry::default()))),
        })
    }

    /// Validate `config`, spawn the worker and start ticking with the
    /// configured delays.
    pub fn launch<S, A, E>(
        config: &ControllerConfig,
        source: S,
        sink: A,
        events: E,
    ) -> error::Result<Self>
    where
        S: TemperatureSource + Send + 'static,
        A: ActuatorSink + Send + 'static,
        E: EventSink + Send + 'static,
    {
        let control = ControlLoop::from_config(config, source, sink, events)?;
        let mut service = Self::new()?;
        service.start(control, config.first_tick_delay(), config.tick_period())?;
        Ok(service)
    }

    /// Arm the first tick after `first_delay`; every tick re-arms the next
    /// one `period` later.
    pub fn start<S, A, E>(
        &mut self,
        mut control: ControlLoop<S, A, E>,
        first_delay: Duration,
        period: Duration,
    ) -> Result<(), SchedulerError>
    where
        S: TemperatureSource + Send + 'static,
        A: ActuatorSink + Send + 'static,
        E: EventSink + Send + 'static,
    {
        if self.state() == RunState::Running {
            return Err(SchedulerError::AlreadyRunning);
        }

        let work = DelayedWork::new();
        self.telemetry.lock(|t| t.set(control.telemetry()));
        control.events_mut().emit(&AppEvent::Started {
            first_delay_ms: duration_ms(first_delay),
            period_ms: duration_ms(period),
        });

        arm(
            self.queue.handle(),
            work.clone(),
            control,
            first_delay,
            period,
            self.telemetry.clone(),
        )?;

        info!(
            "FanService: first tick in {:?}, then every {:?}",
            first_delay, period
        );
        self.work = Some(work);
        Ok(())
    }

    /// Stop ticking and join the worker.  Returns the last telemetry
    /// snapshot.
    ///
    /// The fan is left at whatever level the last tick set.
    pub fn shutdown(&mut self) -> Result<Telemetry, SchedulerError> {
        if let Some(work) = self.work.take() {
            self.queue.cancel(&work);
        }
        self.queue.shutdown()?;
        let last = self.telemetry();
        info!("FanService: stopped after {} ticks", last.ticks);
        Ok(last)
    }

    pub fn state(&self) -> RunState {
        match &self.work {
            Some(w) if !w.is_cancelled() && self.queue.is_running() => RunState::Running,
            _ => RunState::Stopped,
        }
    }

    /// Snapshot as of the last completed tick.
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.lock(Cell::get)
    }
}

// ── Tick chain ────────────────────────────────────────────────

fn arm<S, A, E>(
    handle: QueueHandle,
    work: DelayedWork,
    mut control: ControlLoop<S, A, E>,
    delay: Duration,
    period: Duration,
    telemetry: Arc<TelemetryCell>,
) -> Result<(), SchedulerError>
where
    S: TemperatureSource + Send + 'static,
    A: ActuatorSink + Send + 'static,
    E: EventSink + Send + 'static,
{
    let next = handle.clone();
    let token = work.clone();
    handle.queue_delayed(&work, delay, move || {
        control.tick();
        telemetry.lock(|t| t.set(control.telemetry()));

        let chain = token.clone();
        rearmed(&chain, arm(next, token, control, period, period, telemetry));
    })
}

/// Handle the outcome of re-arming.  Any failure ends the chain, so the
/// token is cancelled and [`FanService::state`] reports `Stopped`.
fn rearmed(work: &DelayedWork, result: Result<(), SchedulerError>) {
    match result {
        Ok(()) => {}
        Err(SchedulerError::Cancelled | SchedulerError::ShutDown) => {
            debug!("FanService: tick chain ended");
        }
        Err(e) => {
            work.cancel();
            error!("FanService: failed to re-arm tick: {}", e);
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
