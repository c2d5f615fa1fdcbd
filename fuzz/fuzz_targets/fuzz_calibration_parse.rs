//! Fuzz target: calibration parse and compensation
//!
//! Splits the input into a T/P block, the `H1` byte, a humidity block and
//! a data burst,
//! then checks:
//! - `CalibrationSet::parse` never panics, and refuses short blocks
//! - Both compensation engines are total over any parsed calibration
//! - Float humidity stays within 0..=100
//!
//! cargo fuzz run fuzz_calibration_parse

#![no_main]

use envirosense::sensors::calibration::CalibrationSet;
use envirosense::sensors::compensation::{self, CompensationMode};
use envirosense::sensors::raw::RawSample;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [split, h1, rest @ ..] = data else {
        return;
    };
    let (split, h1) = (*split, *h1);
    let split = usize::from(split).min(rest.len());
    let (tp, tail) = rest.split_at(split);
    let hum_len = tail.len().min(7);
    let (hum, burst) = tail.split_at(hum_len);

    let cal = match CalibrationSet::parse(tp, h1, hum) {
        Ok(cal) => cal,
        Err(_) => {
            assert!(tp.len() < 24 || hum.len() < 7);
            return;
        }
    };

    let mut raw = [0u8; 8];
    let n = burst.len().min(8);
    raw[..n].copy_from_slice(&burst[..n]);
    let sample = RawSample::from_burst(&raw);

    let float = compensation::compensate_channels(&sample, &cal, CompensationMode::FloatingPoint);
    assert!((0.0..=100.0).contains(&float.humidity_percent));
    if let Ok(hpa) = float.pressure_hpa {
        assert!(hpa.is_finite());
    }

    let fixed = compensation::compensate_channels(&sample, &cal, CompensationMode::FixedPoint);
    assert!((0.0..=100.0).contains(&fixed.humidity_percent));
});
