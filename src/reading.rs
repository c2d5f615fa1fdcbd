//! Reading data model.
//!
//! Every value that leaves the pipeline is a [`Measurement`]: the number
//! plus where it came from.  Consumers must be able to tell a measured
//! value from a synthesized one, so provenance is tracked per field and
//! serialized alongside it.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    RealSensor,
    FallbackSynthetic,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RealSensor => write!(f, "real-sensor"),
            Self::FallbackSynthetic => write!(f, "fallback-synthetic"),
        }
    }
}

/// A value tagged with its [`Provenance`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub source: Provenance,
}

impl Measurement {
    pub fn real(value: f64) -> Self {
        Self {
            value,
            source: Provenance::RealSensor,
        }
    }

    pub fn synthetic(value: f64) -> Self {
        Self {
            value,
            source: Provenance::FallbackSynthetic,
        }
    }

    pub fn is_real(&self) -> bool {
        self.source == Provenance::RealSensor
    }
}

/// Why the fallback generator engaged.
///
/// Missing or unusable hardware is kept apart from `OutOfRange`, where the
/// sensor answered but its value was overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    BusUnavailable,
    WrongDevice,
    CalibrationParse,
    DivisionGuard,
    OutOfRange,
}

impl FallbackReason {
    pub const ALL: [Self; 5] = [
        Self::BusUnavailable,
        Self::WrongDevice,
        Self::CalibrationParse,
        Self::DivisionGuard,
        Self::OutOfRange,
    ];

    /// Dense index for per-reason counters.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<&SensorError> for FallbackReason {
    fn from(e: &SensorError) -> Self {
        match e {
            SensorError::BusUnavailable(_) => Self::BusUnavailable,
            SensorError::WrongDevice { .. } => Self::WrongDevice,
            SensorError::CalibrationParse { .. } => Self::CalibrationParse,
            SensorError::DivisionGuardTriggered => Self::DivisionGuard,
            SensorError::OutOfRange { .. } => Self::OutOfRange,
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusUnavailable => write!(f, "bus unavailable"),
            Self::WrongDevice => write!(f, "wrong device"),
            Self::CalibrationParse => write!(f, "calibration unreadable"),
            Self::DivisionGuard => write!(f, "pressure undefined"),
            Self::OutOfRange => write!(f, "temperature implausible"),
        }
    }
}

/// Core channels after validation and, where needed, substitution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedReading {
    pub temperature_celsius: Measurement,
    pub humidity_percent: Measurement,
    pub pressure_hpa: Measurement,
    /// Set whenever at least one channel was synthesized.
    pub fallback_reason: Option<FallbackReason>,
}

impl ValidatedReading {
    /// `RealSensor` only when every channel was measured.
    pub fn source(&self) -> Provenance {
        if self.temperature_celsius.is_real()
            && self.humidity_percent.is_real()
            && self.pressure_hpa.is_real()
        {
            Provenance::RealSensor
        } else {
            Provenance::FallbackSynthetic
        }
    }
}

/// Auxiliary channels as read; `None` means no value this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AuxReadings {
    pub gas_ohms: Option<f64>,
    pub light_lux: Option<f64>,
    pub noise_db: Option<f64>,
}

/// Auxiliary channels with every gap filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuxChannels {
    pub gas_ohms: Measurement,
    pub light_lux: Measurement,
    pub noise_db: Measurement,
}

/// One timestamped record, the pipeline's only output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: Measurement,
    pub humidity_percent: Measurement,
    pub pressure_hpa: Measurement,
    /// Provenance of the core reading as a whole.
    pub source: Provenance,
    pub fallback_reason: Option<FallbackReason>,
    pub gas_ohms: Measurement,
    pub light_lux: Measurement,
    pub noise_db: Measurement,
    pub air_quality_index: f64,
}
