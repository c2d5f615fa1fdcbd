//! EnviroSense main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  Bme280Adapter     AuxHub        LogEventSink  SystemClock   │
//! │  (SensorPort)      (AuxSource)   (EventSink)   (Clock)       │
//! │  I2cBus (RegisterBus)            FileConfigAdapter           │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │           ReadingService (pure logic)                  │  │
//! │  │  compensate · validate · fall back · assemble          │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use log::{info, warn};
use rppal::hal::Delay;
use rppal::i2c::I2c;

use envirosense::adapters::config_file::FileConfigAdapter;
use envirosense::adapters::hardware::Bme280Adapter;
use envirosense::adapters::i2c_bus::I2cBus;
use envirosense::adapters::log_sink::LogEventSink;
use envirosense::adapters::time::SystemClock;
use envirosense::app::commands::AppCommand;
use envirosense::app::ports::ConfigPort;
use envirosense::app::service::ReadingService;
use envirosense::config::SensorConfig;
use envirosense::diagnostics;
use envirosense::reading::FallbackReason;
use envirosense::sensors::AuxHub;
use envirosense::sensors::light::LightSensor;

const DEFAULT_CONFIG_PATH: &str = "envirosense.json";
/// Cycles between statistics summaries.
const STATS_EVERY: u64 = 40;

fn open_bus(config: &SensorConfig) -> Option<I2c> {
    let opened = I2c::with_bus(config.i2c_bus)
        .and_then(|i2c| i2c.set_timeout(config.bus_timeout_ms).map(|()| i2c));
    match opened {
        Ok(i2c) => Some(i2c),
        Err(e) => {
            warn!(
                "/dev/i2c-{} unavailable ({}); running on fallback data",
                config.i2c_bus, e
            );
            None
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    diagnostics::install_panic_handler();
    info!("EnviroSense v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config (or defaults) ──────────────────────────
    let config_path =
        std::env::var("ENVIROSENSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config_port = FileConfigAdapter::new(&config_path);
    let config = match config_port.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            SensorConfig::default()
        }
    };
    let mut config_stamp = modified(config_port.path());

    // ── 3. Construct adapters ─────────────────────────────────
    let bus = open_bus(&config).map(|i2c| I2cBus::new(i2c, &config.i2c_addresses));
    let mut sensor = Bme280Adapter::new(bus, Delay::new(), &config);

    let light = config.light_sensor_address.and_then(|address| {
        open_bus(&config).map(|i2c| LightSensor::new(i2c, address))
    });
    let mut aux = AuxHub::new(light);

    let clock = SystemClock::new();
    let mut rng = rand::rng();
    let mut sink = LogEventSink::new();

    // ── 4. Construct app service ──────────────────────────────
    let mut app = ReadingService::new(config.clone());
    app.start(&mut sink);

    info!("Polling every {} s", config.poll_interval_secs);

    // ── 5. Polling loop ───────────────────────────────────────
    loop {
        app.cycle(&mut sensor, &mut aux, &clock, &mut rng, &mut sink);

        if app.cycle_count() % STATS_EVERY == 0 {
            let stats = app.stats();
            info!(
                "STATS | cycles={} real={} fallbacks={} (bus={} device={} calib={} pressure={} range={})",
                stats.cycles(),
                stats.real_records(),
                stats.total_fallbacks(),
                stats.fallbacks(FallbackReason::BusUnavailable),
                stats.fallbacks(FallbackReason::WrongDevice),
                stats.fallbacks(FallbackReason::CalibrationParse),
                stats.fallbacks(FallbackReason::DivisionGuard),
                stats.fallbacks(FallbackReason::OutOfRange),
            );
        }

        // Hot-reload the config file when it changes on disk.
        let stamp = modified(config_port.path());
        if stamp != config_stamp {
            config_stamp = stamp;
            match config_port.load() {
                Ok(cfg) => {
                    if let Err(e) = app.handle_command(AppCommand::UpdateConfig(cfg), &mut sensor)
                    {
                        warn!("Config reload rejected: {}", e);
                    }
                }
                Err(e) => warn!("Config reload failed: {}", e),
            }
        }

        std::thread::sleep(Duration::from_secs(u64::from(
            app.config().poll_interval_secs,
        )));
    }
}
