//! Reading assembler: validated core channels + auxiliary channels + a
//! timestamp → one [`SensorRecord`].  Pure; no hardware or network access.

use chrono::{DateTime, Utc};

use crate::reading::{AuxChannels, SensorRecord, ValidatedReading};

/// Temperature with the lowest index penalty, °C.
const OPTIMAL_TEMPERATURE_C: f64 = 22.0;
/// Humidity with the lowest index penalty, %RH.
const OPTIMAL_HUMIDITY_PERCENT: f64 = 50.0;
/// Gas resistance at or above which the gas term is zero, Ω.
const CLEAN_AIR_OHMS: f64 = 500_000.0;
const INDEX_MAX: f64 = 500.0;

pub fn assemble(
    validated: &ValidatedReading,
    aux: &AuxChannels,
    now: DateTime<Utc>,
) -> SensorRecord {
    SensorRecord {
        timestamp: now,
        temperature_celsius: validated.temperature_celsius,
        humidity_percent: validated.humidity_percent,
        pressure_hpa: validated.pressure_hpa,
        source: validated.source(),
        fallback_reason: validated.fallback_reason,
        gas_ohms: aux.gas_ohms,
        light_lux: aux.light_lux,
        noise_db: aux.noise_db,
        air_quality_index: air_quality_index(
            aux.gas_ohms.value,
            validated.temperature_celsius.value,
            validated.humidity_percent.value,
        ),
    }
}

/// 0 (clean) to 500 (poor), one decimal place.
///
/// Lower gas resistance means more volatile compounds; the gas term is
/// then scaled up by the distance from the optimal comfort band.
pub fn air_quality_index(gas_ohms: f64, temperature_celsius: f64, humidity_percent: f64) -> f64 {
    let base = ((CLEAN_AIR_OHMS - gas_ohms) / 1000.0).clamp(0.0, INDEX_MAX);
    let temperature_factor = 1.0 + (temperature_celsius - OPTIMAL_TEMPERATURE_C).abs() / 100.0;
    let humidity_factor = 1.0 + (humidity_percent - OPTIMAL_HUMIDITY_PERCENT).abs() / 200.0;
    let index = (base * temperature_factor * humidity_factor).clamp(0.0, INDEX_MAX);
    if index.is_nan() {
        return INDEX_MAX;
    }
    (index * 10.0).round() / 10.0
}
