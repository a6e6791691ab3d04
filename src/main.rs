//! zonefan: thermal-zone fan controller entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  ThermalZoneSensor   EcFanDriver   LogEventSink              │
//! │  (TemperatureSource) (ActuatorSink) (EventSink)              │
//! │  SimThermalSensor    SimFan        ProcAcpiCall (AcpiBus)    │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          ControlLoop (pure logic)                  │      │
//! │  │  ZoneTable · ZoneSelector · ControlState           │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  FanService (self re-arming tick) · WorkQueue (worker)       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use zonefan::adapters::acpi_call::{ACPI_CALL_PATH, ProcAcpiCall};
use zonefan::adapters::log_sink::LogEventSink;
use zonefan::adapters::sim::{PlantParams, SimFan, SimPlant, SimThermalSensor};
use zonefan::app::control_loop::ControlLoop;
use zonefan::app::ports::{ActuatorSink, TemperatureSource};
use zonefan::app::service::FanService;
use zonefan::config::ControllerConfig;
use zonefan::control::ZoneEntry;
use zonefan::drivers::ec_fan::EcFanDriver;
use zonefan::sensors::thermal_zone::ThermalZoneSensor;

/// Raised by the SIGINT/SIGTERM handler.
static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

type Source = Box<dyn TemperatureSource + Send>;
type Sink = Box<dyn ActuatorSink + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Firmware methods through the `acpi_call` kernel interface.
    Acpi,
    /// In-process thermal model.
    Sim,
}

/// Thermal-zone fan controller with hysteresis.
#[derive(Parser, Debug)]
#[command(name = "zonefan", version, about, long_about = None)]
struct Args {
    /// Sensor and fan backend.
    #[arg(long, value_enum, default_value_t = Backend::Acpi)]
    backend: Backend,

    /// Path of the acpi_call control file.
    #[arg(long, default_value = ACPI_CALL_PATH)]
    acpi_path: PathBuf,

    /// Zone row as THRESHOLD:LEVEL; repeat in ascending order.  The last
    /// threshold is the ceiling.
    #[arg(long = "zone", value_name = "C:LEVEL", value_parser = parse_zone)]
    zones: Vec<ZoneEntry>,

    /// Hysteresis margin in degrees Celsius.
    #[arg(long, value_name = "C")]
    hysteresis: Option<i32>,

    /// Steady-state tick period.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u32>,

    /// Delay before the first tick.
    #[arg(long, value_name = "MS")]
    first_delay_ms: Option<u32>,

    /// Starting temperature of the simulated plant.
    #[arg(long, value_name = "C", default_value_t = 50.0)]
    sim_start: f32,

    /// Log filter (e.g. "info", "zonefan=debug").
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run a single tick, print telemetry as JSON and exit.
    #[arg(long)]
    once: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn parse_zone(s: &str) -> Result<ZoneEntry, String> {
    let (threshold, level) = s
        .split_once(':')
        .ok_or_else(|| format!("expected THRESHOLD:LEVEL, got '{s}'"))?;
    let threshold_c = threshold
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("threshold '{threshold}': {e}"))?;
    let level = level
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("level '{level}': {e}"))?;
    Ok(ZoneEntry::new(threshold_c, level))
}

fn build_config(args: &Args) -> Result<ControllerConfig> {
    let mut config = ControllerConfig::default();
    if !args.zones.is_empty() {
        config.set_zones(&args.zones)?;
    }
    if let Some(h) = args.hysteresis {
        config.hysteresis_c = h;
    }
    if let Some(ms) = args.interval_ms {
        config.tick_period_ms = ms;
    }
    if let Some(ms) = args.first_delay_ms {
        config.first_tick_delay_ms = ms;
    }
    config.validate().context("invalid controller configuration")?;
    Ok(config)
}

fn build_backend(args: &Args, config: &ControllerConfig) -> Result<(Source, Sink)> {
    match args.backend {
        Backend::Acpi => {
            let bus = ProcAcpiCall::new(args.acpi_path.clone());
            if !bus.is_available() {
                bail!(
                    "{} not found; is the acpi_call module loaded?",
                    args.acpi_path.display()
                );
            }
            let sensor = ThermalZoneSensor::new(bus.clone(), config.sensor);
            let fan = EcFanDriver::new(bus);
            Ok((Box::new(sensor), Box::new(fan)))
        }
        Backend::Sim => {
            let plant = SimPlant::new(PlantParams::default(), args.sim_start).shared();
            let sensor = SimThermalSensor::new(plant.clone(), config.sensor);
            let fan = SimFan::new(plant);
            Ok((Box::new(sensor), Box::new(fan)))
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = build_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (source, sink) = build_backend(&args, &config)?;
    if args.once {
        let mut control = ControlLoop::from_config(&config, source, sink, LogEventSink::new())
            .context("invalid controller configuration")?;
        control.tick();
        println!("{}", serde_json::to_string(&control.telemetry())?);
        return Ok(());
    }

    let table = config.zone_table().context("invalid zone table")?;
    info!(
        "zonefan v{} loaded ({:?} backend, {} zones, ceiling {}C)",
        env!("CARGO_PKG_VERSION"),
        args.backend,
        table.zone_count(),
        table.ceiling_threshold()
    );

    ctrlc::set_handler(|| SHUTDOWN.signal(())).context("failed to install signal handler")?;

    let mut service = FanService::launch(&config, source, sink, LogEventSink::new())
        .context("failed to start control loop")?;

    futures_lite::future::block_on(SHUTDOWN.wait());
    info!("zonefan: shutdown requested");

    match service.shutdown() {
        Ok(t) => info!(
            "zonefan unloaded after {} ticks (zone {}, level {:?}, {} sensor / {} actuator failures)",
            t.ticks, t.zone, t.level, t.sensor_failures, t.actuator_failures
        ),
        Err(e) => warn!("zonefan: unclean shutdown: {}", e),
    }
    Ok(())
}
