//! Pipeline configuration.
//!
//! All tunable parameters for the EnviroSense reader.  Values can be
//! overridden from a JSON file (see `adapters::config_file`) or hot-reloaded
//! with `AppCommand::UpdateConfig`.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::registers::{BME280_ADDR_PRIMARY, BME280_ADDR_SECONDARY, LIGHT_SENSOR_ADDR};
use crate::sensors::bme280::{Bme280Settings, Filter, Oversampling, SensorMode, Standby};
use crate::sensors::compensation::CompensationMode;

/// Core reader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    // --- Bus ---
    /// Linux I2C bus number (`/dev/i2c-N`).
    pub i2c_bus: u8,
    /// BME280 addresses, probed in order.
    pub i2c_addresses: [u8; 2],
    /// Per-transaction bus timeout.
    pub bus_timeout_ms: u32,
    /// Ambient light sensor; `None` disables it.
    pub light_sensor_address: Option<u8>,

    // --- BME280 ---
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub humidity_oversampling: Oversampling,
    pub filter: Filter,
    pub standby: Standby,
    pub mode: SensorMode,
    pub compensation: CompensationMode,
    /// Added to every compensated temperature (board self-heating).
    pub temperature_offset_c: f64,

    // --- Validation ---
    pub min_plausible_c: f64,
    pub max_plausible_c: f64,

    // --- Fallback policy (baseline ± spread) ---
    pub fallback_temperature_c: f64,
    pub fallback_temperature_spread_c: f64,
    pub fallback_humidity_percent: f64,
    pub fallback_humidity_spread_percent: f64,
    pub fallback_pressure_hpa: f64,
    pub fallback_pressure_spread_hpa: f64,

    // --- Timing ---
    pub poll_interval_secs: u32,
    /// Cycles to wait after a failed open before probing again.
    pub session_retry_cycles: u32,
    /// Forced-mode conversion timeout.
    pub measurement_timeout_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            // Bus
            i2c_bus: 1,
            i2c_addresses: [BME280_ADDR_PRIMARY, BME280_ADDR_SECONDARY],
            bus_timeout_ms: 100,
            light_sensor_address: Some(LIGHT_SENSOR_ADDR),

            // BME280: ctrl_hum=0x01, ctrl_meas=0x27, config=0xA0
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            humidity_oversampling: Oversampling::X1,
            filter: Filter::Off,
            standby: Standby::Ms1000,
            mode: SensorMode::Normal,
            compensation: CompensationMode::FloatingPoint,
            temperature_offset_c: 0.0,

            // Validation
            min_plausible_c: -20.0,
            max_plausible_c: 50.0,

            // Fallback
            fallback_temperature_c: 25.0,
            fallback_temperature_spread_c: 3.0,
            fallback_humidity_percent: 50.0,
            fallback_humidity_spread_percent: 10.0,
            fallback_pressure_hpa: 1013.25,
            fallback_pressure_spread_hpa: 10.0,

            // Timing
            poll_interval_secs: 15,
            session_retry_cycles: 4,
            measurement_timeout_ms: 50,
        }
    }
}

impl SensorConfig {
    pub fn bme280_settings(&self) -> Bme280Settings {
        Bme280Settings {
            temperature_oversampling: self.temperature_oversampling,
            pressure_oversampling: self.pressure_oversampling,
            humidity_oversampling: self.humidity_oversampling,
            filter: self.filter,
            standby: self.standby,
            mode: self.mode,
            measurement_timeout_ms: self.measurement_timeout_ms,
        }
    }
}

/// Widest synthetic jitter the fallback policy allows around each baseline.
const MAX_TEMPERATURE_SPREAD_C: f64 = 3.0;
const MAX_HUMIDITY_SPREAD_PERCENT: f64 = 10.0;
const MAX_PRESSURE_SPREAD_HPA: f64 = 10.0;

/// Range-check every field.  Rejects, never clamps.
pub fn validate_config(cfg: &SensorConfig) -> Result<(), ConfigError> {
    if cfg.i2c_addresses.iter().any(|a| !(0x08..=0x77).contains(a)) {
        return Err(ConfigError::ValidationFailed(
            "i2c_addresses must be 7-bit addresses 0x08–0x77",
        ));
    }
    if cfg
        .light_sensor_address
        .is_some_and(|a| !(0x08..=0x77).contains(&a))
    {
        return Err(ConfigError::ValidationFailed(
            "light_sensor_address must be 0x08–0x77",
        ));
    }
    if !(10..=10_000).contains(&cfg.bus_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "bus_timeout_ms must be 10–10000",
        ));
    }
    if !(-10.0..=10.0).contains(&cfg.temperature_offset_c) {
        return Err(ConfigError::ValidationFailed(
            "temperature_offset_c must be -10.0–10.0",
        ));
    }
    if !(cfg.min_plausible_c.is_finite() && cfg.max_plausible_c.is_finite())
        || cfg.min_plausible_c >= cfg.max_plausible_c
    {
        return Err(ConfigError::ValidationFailed(
            "min_plausible_c must be below max_plausible_c",
        ));
    }
    if !(0.0..=MAX_TEMPERATURE_SPREAD_C).contains(&cfg.fallback_temperature_spread_c) {
        return Err(ConfigError::ValidationFailed(
            "fallback_temperature_spread_c must be 0.0–3.0",
        ));
    }
    let fallback_temp_low = cfg.fallback_temperature_c - cfg.fallback_temperature_spread_c;
    let fallback_temp_high = cfg.fallback_temperature_c + cfg.fallback_temperature_spread_c;
    if !(cfg.min_plausible_c..=cfg.max_plausible_c).contains(&fallback_temp_low)
        || !(cfg.min_plausible_c..=cfg.max_plausible_c).contains(&fallback_temp_high)
    {
        return Err(ConfigError::ValidationFailed(
            "fallback temperature window must lie inside the plausibility window",
        ));
    }
    if !cfg.fallback_humidity_percent.is_finite()
        || !(0.0..=MAX_HUMIDITY_SPREAD_PERCENT).contains(&cfg.fallback_humidity_spread_percent)
        || cfg.fallback_humidity_percent - cfg.fallback_humidity_spread_percent < 0.0
        || cfg.fallback_humidity_percent + cfg.fallback_humidity_spread_percent > 100.0
    {
        return Err(ConfigError::ValidationFailed(
            "fallback humidity spread must be 0–10 % and the window within 0–100 %",
        ));
    }
    if !(300.0..=1100.0).contains(&cfg.fallback_pressure_hpa)
        || !(0.0..=MAX_PRESSURE_SPREAD_HPA).contains(&cfg.fallback_pressure_spread_hpa)
    {
        return Err(ConfigError::ValidationFailed(
            "fallback pressure must be 300–1100 hPa with spread 0–10",
        ));
    }
    if !(1..=3600).contains(&cfg.poll_interval_secs) {
        return Err(ConfigError::ValidationFailed(
            "poll_interval_secs must be 1–3600",
        ));
    }
    if cfg.session_retry_cycles > 1000 {
        return Err(ConfigError::ValidationFailed(
            "session_retry_cycles must be 0–1000",
        ));
    }
    if !(5..=1000).contains(&cfg.measurement_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "measurement_timeout_ms must be 5–1000",
        ));
    }
    Ok(())
}
