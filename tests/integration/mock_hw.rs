//! Mock sensor, fan and event sink for integration tests.
//!
//! State lives behind `Arc<Mutex<..>>` so a test can keep a handle after
//! the mock has been moved into a control loop running on the tick
//! worker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use zonefan::app::events::AppEvent;
use zonefan::app::ports::{ActuatorSink, EventSink, TemperatureSource};
use zonefan::error::{ActuatorError, SensorError};

// ── Scripted sensor ───────────────────────────────────────────

/// Replays a script of readings, then repeats the last one.
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    script: Arc<Mutex<VecDeque<Result<i32, SensorError>>>>,
    last: Arc<Mutex<Option<Result<i32, SensorError>>>>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(readings: &[Result<i32, SensorError>]) -> Self {
        Self {
            script: Arc::new(Mutex::new(readings.iter().copied().collect())),
            last: Arc::new(Mutex::new(None)),
        }
    }

    pub fn temps(temps: &[i32]) -> Self {
        let readings: Vec<_> = temps.iter().map(|&t| Ok(t)).collect();
        Self::new(&readings)
    }

    pub fn push(&self, reading: Result<i32, SensorError>) {
        self.script.lock().unwrap().push_back(reading);
    }
}

impl TemperatureSource for ScriptedSensor {
    fn read(&mut self) -> Result<i32, SensorError> {
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(r) = next {
            *last = Some(r);
        }
        (*last).unwrap_or(Err(SensorError::Unavailable))
    }
}

// ── Recording fan ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCall {
    SetLevel { level: u8, ceiling_c: i32 },
    Release { ceiling_c: i32 },
}

#[derive(Clone, Default)]
pub struct MockFan {
    calls: Arc<Mutex<Vec<FanCall>>>,
    failures: Arc<Mutex<VecDeque<ActuatorError>>>,
}

#[allow(dead_code)]
impl MockFan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FanCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<FanCall> {
        self.calls.lock().unwrap().last().copied()
    }

    /// Fail the next calls with these errors, in order.
    pub fn fail_with(&self, errors: &[ActuatorError]) {
        self.failures.lock().unwrap().extend(errors.iter().copied());
    }

    fn record(&mut self, call: FanCall) -> Result<(), ActuatorError> {
        self.calls.lock().unwrap().push(call);
        self.failures.lock().unwrap().pop_front().map_or(Ok(()), Err)
    }
}

impl ActuatorSink for MockFan {
    fn set_level(&mut self, level: u8, ceiling_c: i32) -> Result<(), ActuatorError> {
        self.record(FanCall::SetLevel { level, ceiling_c })
    }

    fn release(&mut self, ceiling_c: i32) -> Result<(), ActuatorError> {
        self.record(FanCall::Release { ceiling_c })
    }
}

// ── Event log ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
