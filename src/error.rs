//! Error types for the fan controller.
//!
//! Sensor and actuator errors are transient: the control loop logs them,
//! emits them as events and keeps ticking.  Configuration and scheduler
//! errors stop the loop from starting and fold into the top-level
//! [`Error`].  All variants are `Copy` so they pass through the control
//! loop and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Everything that can stop the control loop from starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The zone table or timing configuration is malformed.
    Config(ConfigError),
    /// The tick work queue failed.
    Scheduler(SchedulerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Transient: the tick is skipped and the last actuator state persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The firmware method evaluation failed.
    ReadFailed,
    /// The backend returned something that is not an integer.
    Malformed,
    /// The sensor backend is not present on this machine.
    Unavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "temperature read failed"),
            Self::Malformed => write!(f, "malformed temperature value"),
            Self::Unavailable => write!(f, "sensor unavailable"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Transient: logged, the loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Registering the manual-control temperature ceiling failed.
    LimitRejected,
    /// Writing the fan level failed.
    WriteFailed,
    /// The actuator backend is not present on this machine.
    Unavailable,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitRejected => write!(f, "temperature limit rejected"),
            Self::WriteFailed => write!(f, "fan level write failed"),
            Self::Unavailable => write!(f, "actuator unavailable"),
        }
    }
}

impl std::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Fatal at startup: the loop must not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Fewer than two zones; hysteresis needs an interior boundary.
    TooFewZones(usize),
    /// More zones than the fixed-capacity table holds.
    TooManyZones(usize),
    /// Threshold at this index is not above the previous one.
    ThresholdsNotIncreasing(usize),
    /// Level at this index is not above the previous one.
    LevelsNotIncreasing(usize),
    /// Hysteresis margin is negative.
    NegativeHysteresis(i32),
    /// A timing value is zero.
    ZeroInterval(&'static str),
    /// The first tick would fire later than the steady-state period.
    FirstDelayTooLong,
    /// Sensor scale divisor is zero or negative.
    InvalidSensorScale(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewZones(n) => write!(f, "zone table needs at least 2 zones, got {n}"),
            Self::TooManyZones(n) => write!(
                f,
                "zone table holds at most {} zones, got {n}",
                crate::control::zones::MAX_ZONES
            ),
            Self::ThresholdsNotIncreasing(i) => {
                write!(f, "zone {i}: threshold not strictly increasing")
            }
            Self::LevelsNotIncreasing(i) => write!(f, "zone {i}: level not strictly increasing"),
            Self::NegativeHysteresis(h) => write!(f, "hysteresis margin {h} is negative"),
            Self::ZeroInterval(name) => write!(f, "{name} must be non-zero"),
            Self::FirstDelayTooLong => {
                write!(f, "first tick delay must not exceed the tick period")
            }
            Self::InvalidSensorScale(s) => write!(f, "sensor scale {s} must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The worker thread could not be spawned.
    SpawnFailed,
    /// The request channel is full.
    QueueFull,
    /// The work item was cancelled; it will not be armed again.
    Cancelled,
    /// The queue has been shut down.
    ShutDown,
    /// Shutdown was requested from inside a work callback.
    ShutdownFromWorker,
    /// The control loop is already armed.
    AlreadyRunning,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "worker thread spawn failed"),
            Self::QueueFull => write!(f, "request queue full"),
            Self::Cancelled => write!(f, "work cancelled"),
            Self::ShutDown => write!(f, "work queue shut down"),
            Self::ShutdownFromWorker => write!(f, "shutdown requested from the worker thread"),
            Self::AlreadyRunning => write!(f, "control loop already running"),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
