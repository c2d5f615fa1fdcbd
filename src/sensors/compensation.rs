//! BME280 compensation engine.
//!
//! Converts a [`RawSample`] plus the unit's [`CalibrationSet`] into physical
//! units using the manufacturer's double-precision formulas (datasheet
//! section 8.1).  Every function here is pure and deterministic, so it can
//! be called from any thread without synchronisation.
//!
//! Temperature is always computed first: its intermediate `t_fine` feeds
//! both the pressure and humidity formulas, which are otherwise independent.
//!
//! The integer variant lives in [`fixed_point`](super::fixed_point); select
//! between them with [`CompensationMode`].

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

use super::calibration::CalibrationSet;
use super::fixed_point;
use super::raw::RawSample;

/// Which formula family the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompensationMode {
    /// Double-precision formulas.
    #[default]
    FloatingPoint,
    /// 32/64-bit integer formulas; same result to one decimal place.
    FixedPoint,
}

/// Fully compensated measurement.  `humidity_percent` is always in
/// `0.0..=100.0`; temperature and pressure are left unclamped for the
/// validator to judge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedReading {
    pub temperature_celsius: f64,
    pub pressure_hpa: f64,
    pub humidity_percent: f64,
}

/// Per-channel engine output.  Pressure can fail on its own (division
/// guard) without invalidating temperature or humidity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensatedChannels {
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub pressure_hpa: Result<f64, SensorError>,
}

impl CompensatedChannels {
    /// Collapse into a full reading, failing if pressure is undefined.
    pub fn into_reading(self) -> Result<CompensatedReading, SensorError> {
        Ok(CompensatedReading {
            temperature_celsius: self.temperature_celsius,
            pressure_hpa: self.pressure_hpa?,
            humidity_percent: self.humidity_percent,
        })
    }

    /// Shift temperature by a board-specific correction (self-heating).
    pub fn with_temperature_offset(mut self, offset_c: f64) -> Self {
        self.temperature_celsius += offset_c;
        self
    }
}

impl From<CompensatedReading> for CompensatedChannels {
    fn from(r: CompensatedReading) -> Self {
        Self {
            temperature_celsius: r.temperature_celsius,
            humidity_percent: r.humidity_percent,
            pressure_hpa: Ok(r.pressure_hpa),
        }
    }
}

/// Compensate with the double-precision formulas.
///
/// Returns [`SensorError::DivisionGuardTriggered`] when the pressure
/// denominator is zero (e.g. a calibration set with `P1 == 0`).
pub fn compensate(raw: &RawSample, cal: &CalibrationSet) -> Result<CompensatedReading, SensorError> {
    compensate_channels(raw, cal, CompensationMode::FloatingPoint).into_reading()
}

/// Compensate every channel with the selected formula family.
pub fn compensate_channels(
    raw: &RawSample,
    cal: &CalibrationSet,
    mode: CompensationMode,
) -> CompensatedChannels {
    match mode {
        CompensationMode::FloatingPoint => {
            let (temperature_celsius, t_fine) = temperature(raw.adc_temperature, cal);
            CompensatedChannels {
                temperature_celsius,
                humidity_percent: humidity(raw.adc_humidity, t_fine, cal),
                pressure_hpa: pressure(raw.adc_pressure, t_fine, cal),
            }
        }
        CompensationMode::FixedPoint => fixed_point::compensate_channels(raw, cal),
    }
}

/// Returns `(celsius, t_fine)`.
pub fn temperature(adc_t: u32, cal: &CalibrationSet) -> (f64, f64) {
    let adc_t = f64::from(adc_t);
    let t1 = f64::from(cal.t1);

    let var1 = (adc_t / 16384.0 - t1 / 1024.0) * f64::from(cal.t2);
    let d = adc_t / 131072.0 - t1 / 8192.0;
    let var2 = d * d * f64::from(cal.t3);

    let t_fine = var1 + var2;
    (t_fine / 5120.0, t_fine)
}

/// Pressure in hPa.
pub fn pressure(adc_p: u32, t_fine: f64, cal: &CalibrationSet) -> Result<f64, SensorError> {
    let var1 = t_fine / 2.0 - 64000.0;
    let var2 = var1 * var1 * f64::from(cal.p6) / 32768.0 + var1 * f64::from(cal.p5) * 2.0;
    let var2 = var2 / 4.0 + f64::from(cal.p4) * 65536.0;
    let var1 = (f64::from(cal.p3) * var1 * var1 / 524288.0 + f64::from(cal.p2) * var1) / 524288.0;
    let var1 = (1.0 + var1 / 32768.0) * f64::from(cal.p1);

    if var1 == 0.0 {
        return Err(SensorError::DivisionGuardTriggered);
    }

    let p = 1048576.0 - f64::from(adc_p);
    let p = (p - var2 / 4096.0) * 6250.0 / var1;
    let p = p + (f64::from(cal.p9) * p * p / 2147483648.0 + p * f64::from(cal.p8) / 32768.0
        + f64::from(cal.p7))
        / 16.0;

    let hpa = p / 100.0;
    if !hpa.is_finite() {
        return Err(SensorError::DivisionGuardTriggered);
    }
    Ok(hpa)
}

/// Relative humidity in %, clamped to `0.0..=100.0`.
pub fn humidity(adc_h: u32, t_fine: f64, cal: &CalibrationSet) -> f64 {
    let var_h = t_fine - 76800.0;
    let var_h = (f64::from(adc_h) - (f64::from(cal.h4) * 64.0 + f64::from(cal.h5) / 16384.0 * var_h))
        * (f64::from(cal.h2) / 65536.0
            * (1.0
                + f64::from(cal.h6) / 67108864.0
                    * var_h
                    * (1.0 + f64::from(cal.h3) / 67108864.0 * var_h)));
    let var_h = var_h * (1.0 - f64::from(cal.h1) * var_h / 524288.0);

    if var_h.is_nan() {
        return 0.0;
    }
    var_h.clamp(0.0, 100.0)
}
