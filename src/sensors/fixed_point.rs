//! Integer compensation formulas (datasheet section 4.2.3 / 8.2).
//!
//! Bit-exact with the manufacturer's 32-bit temperature/humidity and 64-bit
//! pressure routines for in-range data.  Intermediate products use wrapping
//! arithmetic so a garbage burst yields a garbage (and later rejected)
//! value instead of an overflow panic.

use crate::error::SensorError;

use super::calibration::CalibrationSet;
use super::compensation::CompensatedChannels;
use super::raw::RawSample;

pub fn compensate_channels(raw: &RawSample, cal: &CalibrationSet) -> CompensatedChannels {
    let (centi_celsius, t_fine) = temperature(raw.adc_temperature, cal);
    CompensatedChannels {
        temperature_celsius: f64::from(centi_celsius) / 100.0,
        humidity_percent: f64::from(humidity(raw.adc_humidity, t_fine, cal)) / 1024.0,
        pressure_hpa: pressure(raw.adc_pressure, t_fine, cal)
            .map(|q24_8| f64::from(q24_8) / 256.0 / 100.0),
    }
}

/// Returns `(temperature in 0.01 °C, t_fine)`.
pub fn temperature(adc_t: u32, cal: &CalibrationSet) -> (i32, i32) {
    let adc_t = i64::from(adc_t);
    let t1 = i64::from(cal.t1);

    let var1 = (((adc_t >> 3) - (t1 << 1)) * i64::from(cal.t2)) >> 11;
    let d = (adc_t >> 4) - t1;
    let var2 = (((d * d) >> 12) * i64::from(cal.t3)) >> 14;

    let t_fine = (var1 + var2) as i32;
    let centi = (t_fine.wrapping_mul(5).wrapping_add(128)) >> 8;
    (centi, t_fine)
}

/// Pressure in Pa as unsigned Q24.8 (`value / 256` = Pa).
pub fn pressure(adc_p: u32, t_fine: i32, cal: &CalibrationSet) -> Result<u32, SensorError> {
    let mut var1 = i64::from(t_fine) - 128000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(i64::from(cal.p6));
    var2 = var2.wrapping_add(var1.wrapping_mul(i64::from(cal.p5)) << 17);
    var2 = var2.wrapping_add(i64::from(cal.p4) << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(i64::from(cal.p3)) >> 8)
        .wrapping_add(var1.wrapping_mul(i64::from(cal.p2)) << 12);
    var1 = ((1_i64 << 47).wrapping_add(var1)).wrapping_mul(i64::from(cal.p1)) >> 33;

    if var1 == 0 {
        return Err(SensorError::DivisionGuardTriggered);
    }

    let mut p = 1048576 - i64::from(adc_p);
    p = ((p << 31).wrapping_sub(var2)).wrapping_mul(3125).wrapping_div(var1);
    var1 = i64::from(cal.p9).wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = i64::from(cal.p8).wrapping_mul(p) >> 19;
    p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(i64::from(cal.p7) << 4);

    Ok(p as u32)
}

/// Relative humidity in %RH as unsigned Q22.10 (`value / 1024` = %RH),
/// clamped to 0..=100 %.
pub fn humidity(adc_h: u32, t_fine: i32, cal: &CalibrationSet) -> u32 {
    let h1 = i64::from(cal.h1);
    let h2 = i64::from(cal.h2);
    let h3 = i64::from(cal.h3);
    let h4 = i64::from(cal.h4);
    let h5 = i64::from(cal.h5);
    let h6 = i64::from(cal.h6);

    let x = i64::from(t_fine) - 76800;
    let a = (((i64::from(adc_h) << 14) - (h4 << 20) - h5.wrapping_mul(x)) + 16384) >> 15;
    let b = (((((x.wrapping_mul(h6) >> 10).wrapping_mul((x.wrapping_mul(h3) >> 11) + 32768))
        >> 10)
        + 2097152)
        .wrapping_mul(h2)
        + 8192)
        >> 14;
    let mut x = a.wrapping_mul(b);
    let sq = (x >> 15).wrapping_mul(x >> 15) >> 7;
    x = x.wrapping_sub(sq.wrapping_mul(h1) >> 4);
    x = x.clamp(0, 419430400);

    (x >> 12) as u32
}
