//! Error types for the EnviroSense pipeline.
//!
//! [`SensorError`] is the one failure type the polling loop sees; bus
//! transactions report a [`BusFault`] that converts into it.  All variants
//! are `Copy` so they can be carried through events, statistics and
//! provenance tags without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Bus faults
// ---------------------------------------------------------------------------

/// Why a bus transaction failed.  Mirrors `embedded_hal::i2c::ErrorKind`
/// plus the cases the HAL has no word for (device node missing, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// The bus device could not be opened.
    Open,
    /// No device acknowledged the address or a data byte.
    NoAcknowledge,
    /// Another master won arbitration.
    ArbitrationLoss,
    /// Misplaced START/STOP or other electrical bus error.
    Bus,
    /// Data was not read fast enough.
    Overrun,
    /// The device did not finish within the allotted time.
    Timeout,
    /// Anything the HAL reports as `Other`.
    Other,
}

impl fmt::Display for BusFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "bus device could not be opened"),
            Self::NoAcknowledge => write!(f, "no acknowledge"),
            Self::ArbitrationLoss => write!(f, "arbitration lost"),
            Self::Bus => write!(f, "bus error"),
            Self::Overrun => write!(f, "overrun"),
            Self::Timeout => write!(f, "timed out"),
            Self::Other => write!(f, "unspecified bus error"),
        }
    }
}

impl From<embedded_hal::i2c::ErrorKind> for BusFault {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::NoAcknowledge,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLoss,
            ErrorKind::Bus => Self::Bus,
            ErrorKind::Overrun => Self::Overrun,
            _ => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Which calibration area a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationBlock {
    /// 0x88..=0x9F: temperature and pressure.
    TemperaturePressure,
    /// 0xE1..=0xE7: humidity coefficients other than `H1`.
    Humidity,
}

impl fmt::Display for CalibrationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemperaturePressure => write!(f, "temperature/pressure"),
            Self::Humidity => write!(f, "humidity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Cannot open or talk to the bus.  Fatal for the cycle.
    BusUnavailable(BusFault),
    /// The identity register did not hold the BME280 chip id.
    WrongDevice { found: u8 },
    /// The calibration block was truncated.  Fatal for the session.
    CalibrationParse {
        block: CalibrationBlock,
        needed: usize,
        found: usize,
    },
    /// The pressure formula's denominator evaluated to zero.
    DivisionGuardTriggered,
    /// Compensated temperature fell outside the plausibility window.
    /// Stored in milli-degrees so the error stays `Eq`.
    OutOfRange { millidegrees: i32 },
}

impl SensorError {
    /// Build an [`OutOfRange`](Self::OutOfRange) from a temperature in °C.
    pub fn out_of_range(celsius: f64) -> Self {
        Self::OutOfRange {
            millidegrees: (celsius * 1000.0).round() as i32,
        }
    }

    /// True if the failure invalidates the whole session rather than one cycle.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::CalibrationParse { .. })
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusUnavailable(fault) => write!(f, "bus unavailable ({fault})"),
            Self::WrongDevice { found } => {
                write!(f, "wrong device (chip id 0x{found:02X}, expected 0x60)")
            }
            Self::CalibrationParse {
                block,
                needed,
                found,
            } => write!(
                f,
                "{block} calibration block truncated ({found} of {needed} bytes)"
            ),
            Self::DivisionGuardTriggered => write!(f, "pressure denominator is zero"),
            Self::OutOfRange { millidegrees } => write!(
                f,
                "temperature {:.1}\u{00b0}C outside plausibility window",
                *millidegrees as f64 / 1000.0
            ),
        }
    }
}

impl From<BusFault> for SensorError {
    fn from(fault: BusFault) -> Self {
        Self::BusUnavailable(fault)
    }
}

impl core::error::Error for SensorError {}
