//! Port traits: the hexagonal boundary between the pipeline and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ReadingService (domain)
//! ```
//!
//! Driven adapters (register bus, sensor session, auxiliary channels,
//! clock, randomness, event sinks, config storage) implement these traits.
//! The [`ReadingService`](super::service::ReadingService) consumes them via
//! generics, so the domain core never touches hardware directly.

use chrono::{DateTime, Utc};

use crate::config::SensorConfig;
use crate::error::{BusFault, SensorError};
use crate::reading::AuxReadings;
use crate::sensors::compensation::CompensatedChannels;

// ───────────────────────────────────────────────────────────────
// Register bus (hardware → session)
// ───────────────────────────────────────────────────────────────

/// Register-level access to one device.  Every call is bounded in time;
/// a stalled bus surfaces as a [`BusFault`], never a hang.
pub trait RegisterBus {
    /// Fill `buf` from consecutive registers starting at `register`.
    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusFault>;

    fn read_byte(&mut self, register: u8) -> Result<u8, BusFault> {
        let mut b = [0u8; 1];
        self.read_block(register, &mut b)?;
        Ok(b[0])
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusFault>;

    /// Locate the device before a session opens.  Buses with a fixed
    /// target have nothing to do.
    fn probe(&mut self) -> Result<(), BusFault> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
pub trait SensorPort {
    /// Compensated channels, or the typed reason there are none.
    fn measure(&mut self) -> Result<CompensatedChannels, SensorError>;

    /// Drop the current session; the next `measure` resets the sensor and
    /// re-reads calibration.
    fn reset_session(&mut self);

    fn is_session_open(&self) -> bool;

    /// Apply hardware-side settings from a new configuration.
    fn reconfigure(&mut self, config: &SensorConfig);
}

/// Gas, light and noise.  Missing channels are `None`.
pub trait AuxSource {
    fn read(&mut self) -> AuxReadings;
}

// ───────────────────────────────────────────────────────────────
// Randomness and time
// ───────────────────────────────────────────────────────────────

/// Bounded uniform generator for fallback synthesis.
pub trait RandomSource {
    /// Uniform sample from `low..=high`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: rand::Rng> RandomSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(low.is_finite() && high.is_finite()) || low >= high {
            return low;
        }
        self.random_range(low..=high)
    }
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0–23) in the board's local time zone.
    fn local_hour(&self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / publishing)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, HTTP, MQTT,
/// LED).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`SensorConfig`].
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Returns [`SensorConfig::default()`] if nothing is stored yet.
    fn load(&self) -> Result<SensorConfig, ConfigError>;

    fn save(&self, config: &SensorConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config could not be deserialized.
    Corrupted,
    /// A field failed range validation; the message names it.
    ValidationFailed(&'static str),
    /// The backing store could not be read or written.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
