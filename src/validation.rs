//! Plausibility validation and fallback synthesis.
//!
//! The degradation policy, stated once for operators:
//!
//! * A compensated temperature outside the plausibility window is
//!   **rejected** and the whole core reading is replaced.
//! * A sensor that cannot be reached, identified or calibrated yields a
//!   fully synthetic reading.
//! * An undefined pressure (zero denominator) replaces pressure only.
//! * Missing auxiliary channels are synthesized individually.
//!
//! Every substituted value is tagged `fallback-synthetic`; nothing is ever
//! fabricated silently.  Synthetic values are uniform within
//! `baseline ± spread`.
//!
//! [`Validator`] holds only configuration, so it is `Send + Sync` and all
//! randomness is injected per call.

use log::warn;

use crate::app::ports::RandomSource;
use crate::config::SensorConfig;
use crate::error::SensorError;
use crate::reading::{AuxChannels, AuxReadings, FallbackReason, Measurement, ValidatedReading};
use crate::sensors::compensation::{CompensatedChannels, CompensatedReading};

/// Synthetic gas resistance window, Ω.
pub const GAS_OHMS_RANGE: (f64, f64) = (200_000.0, 400_000.0);
/// Synthetic daylight window (06:00–18:59 local), lux.
pub const DAY_LUX_RANGE: (f64, f64) = (200.0, 1000.0);
pub const NIGHT_LUX_RANGE: (f64, f64) = (0.0, 50.0);
/// Synthetic ambient noise window, dB.
pub const NOISE_DB_RANGE: (f64, f64) = (30.0, 80.0);

/// Accepted temperature range, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityWindow {
    pub min_celsius: f64,
    pub max_celsius: f64,
}

impl Default for PlausibilityWindow {
    fn default() -> Self {
        Self {
            min_celsius: -20.0,
            max_celsius: 50.0,
        }
    }
}

impl PlausibilityWindow {
    /// NaN is never plausible.
    pub fn contains(&self, celsius: f64) -> bool {
        (self.min_celsius..=self.max_celsius).contains(&celsius)
    }
}

/// Baselines and symmetric spreads for synthetic core values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    pub temperature_celsius: f64,
    pub temperature_spread: f64,
    pub humidity_percent: f64,
    pub humidity_spread: f64,
    pub pressure_hpa: f64,
    pub pressure_spread: f64,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            temperature_celsius: 25.0,
            temperature_spread: 3.0,
            humidity_percent: 50.0,
            humidity_spread: 10.0,
            pressure_hpa: 1013.25,
            pressure_spread: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Validator {
    pub window: PlausibilityWindow,
    pub policy: FallbackPolicy,
}

impl Validator {
    pub fn new(window: PlausibilityWindow, policy: FallbackPolicy) -> Self {
        Self { window, policy }
    }

    pub fn from_config(cfg: &SensorConfig) -> Self {
        Self {
            window: PlausibilityWindow {
                min_celsius: cfg.min_plausible_c,
                max_celsius: cfg.max_plausible_c,
            },
            policy: FallbackPolicy {
                temperature_celsius: cfg.fallback_temperature_c,
                temperature_spread: cfg.fallback_temperature_spread_c,
                humidity_percent: cfg.fallback_humidity_percent,
                humidity_spread: cfg.fallback_humidity_spread_percent,
                pressure_hpa: cfg.fallback_pressure_hpa,
                pressure_spread: cfg.fallback_pressure_spread_hpa,
            },
        }
    }

    /// `Err(OutOfRange)` if the temperature is outside the window.
    pub fn check(&self, temperature_celsius: f64) -> Result<(), SensorError> {
        if self.window.contains(temperature_celsius) {
            Ok(())
        } else {
            Err(SensorError::out_of_range(temperature_celsius))
        }
    }

    /// Accept a complete reading or replace it.
    pub fn validate(
        &self,
        reading: CompensatedReading,
        rng: &mut impl RandomSource,
    ) -> ValidatedReading {
        self.resolve(Ok(reading.into()), rng)
    }

    /// Turn one cycle's engine outcome into a validated reading, applying
    /// the degradation policy from the module docs.
    pub fn resolve(
        &self,
        outcome: Result<CompensatedChannels, SensorError>,
        rng: &mut impl RandomSource,
    ) -> ValidatedReading {
        let channels = match outcome {
            Ok(ch) => ch,
            Err(e) => return self.substitute(FallbackReason::from(&e), rng),
        };

        if let Err(e) = self.check(channels.temperature_celsius) {
            warn!("Rejected reading: {}", e);
            return self.substitute(FallbackReason::OutOfRange, rng);
        }

        let temperature_celsius = Measurement::real(channels.temperature_celsius);
        let humidity_percent = Measurement::real(channels.humidity_percent);
        match channels.pressure_hpa {
            Ok(hpa) => ValidatedReading {
                temperature_celsius,
                humidity_percent,
                pressure_hpa: Measurement::real(hpa),
                fallback_reason: None,
            },
            Err(e) => ValidatedReading {
                temperature_celsius,
                humidity_percent,
                pressure_hpa: self.synthetic_pressure(rng),
                fallback_reason: Some(FallbackReason::from(&e)),
            },
        }
    }

    /// A fully synthetic core reading.
    pub fn substitute(
        &self,
        reason: FallbackReason,
        rng: &mut impl RandomSource,
    ) -> ValidatedReading {
        let p = &self.policy;
        ValidatedReading {
            temperature_celsius: Measurement::synthetic(jitter(
                rng,
                p.temperature_celsius,
                p.temperature_spread,
            )),
            humidity_percent: Measurement::synthetic(
                jitter(rng, p.humidity_percent, p.humidity_spread).clamp(0.0, 100.0),
            ),
            pressure_hpa: self.synthetic_pressure(rng),
            fallback_reason: Some(reason),
        }
    }

    fn synthetic_pressure(&self, rng: &mut impl RandomSource) -> Measurement {
        Measurement::synthetic(jitter(
            rng,
            self.policy.pressure_hpa,
            self.policy.pressure_spread,
        ))
    }

    /// Fill every missing auxiliary channel.  Light follows the local
    /// day/night cycle.
    pub fn complete_aux(
        &self,
        aux: AuxReadings,
        local_hour: u8,
        rng: &mut impl RandomSource,
    ) -> AuxChannels {
        let lux_range = if (6..19).contains(&local_hour) {
            DAY_LUX_RANGE
        } else {
            NIGHT_LUX_RANGE
        };
        AuxChannels {
            gas_ohms: or_synthetic(aux.gas_ohms, GAS_OHMS_RANGE, rng),
            light_lux: or_synthetic(aux.light_lux, lux_range, rng),
            noise_db: or_synthetic(aux.noise_db, NOISE_DB_RANGE, rng),
        }
    }
}

fn jitter(rng: &mut impl RandomSource, baseline: f64, spread: f64) -> f64 {
    let spread = spread.abs();
    rng.uniform(baseline - spread, baseline + spread)
}

fn or_synthetic(
    value: Option<f64>,
    (low, high): (f64, f64),
    rng: &mut impl RandomSource,
) -> Measurement {
    match value {
        Some(v) if v.is_finite() => Measurement::real(v),
        _ => Measurement::synthetic(rng.uniform(low, high)),
    }
}
