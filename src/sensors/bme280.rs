//! BME280 bus session.
//!
//! A [`Bme280Session`] owns the register bus and the calibration set read
//! at open time.  Every operation takes `&mut self`, so reset, configure,
//! trigger and burst read can never interleave with another cycle.
//!
//! ## Open sequence
//!
//! 1. Probe the bus (address selection is the bus's business).
//! 2. Require chip id 0x60 at 0xD0.
//! 3. Soft reset, wait 2 ms, poll `im_update` until the NVM copy is done.
//! 4. Read the T/P trim burst, `H1` at 0xA1 and the humidity burst, then
//!    parse them.
//! 5. Write `ctrl_hum`, then `config`, then `ctrl_meas`; `ctrl_hum` only
//!    latches on the following `ctrl_meas` write.

use embedded_hal::delay::DelayNs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app::ports::RegisterBus;
use crate::error::{BusFault, SensorError};
use crate::registers::{
    BME280_CHIP_ID, CALIB_H_LEN, CALIB_TP_LEN, DATA_LEN, REG_CALIB_H, REG_CALIB_H1, REG_CALIB_TP,
    REG_CHIP_ID, REG_CONFIG, REG_CTRL_HUM, REG_CTRL_MEAS, REG_DATA, REG_RESET, REG_STATUS, SOFT_RESET_CMD,
    STATUS_IM_UPDATE, STATUS_MEASURING,
};

use super::calibration::CalibrationSet;
use super::compensation::{self, CompensatedChannels, CompensationMode};
use super::raw::RawSample;

/// Start-up time after a soft reset (datasheet table 1).
const RESET_SETTLE_MS: u32 = 2;
/// NVM copy normally finishes within one or two polls.
const IM_UPDATE_POLLS: u32 = 10;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Per-channel oversampling (`osrs_*` fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Oversampling {
    /// Channel disabled; its output register holds 0x80000.
    Skipped,
    #[default]
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    fn bits(self) -> u8 {
        match self {
            Self::Skipped => 0b000,
            Self::X1 => 0b001,
            Self::X2 => 0b010,
            Self::X4 => 0b011,
            Self::X8 => 0b100,
            Self::X16 => 0b101,
        }
    }
}

/// IIR filter coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    Off,
    X2,
    X4,
    X8,
    X16,
}

impl Filter {
    fn bits(self) -> u8 {
        match self {
            Self::Off => 0b000,
            Self::X2 => 0b001,
            Self::X4 => 0b010,
            Self::X8 => 0b011,
            Self::X16 => 0b100,
        }
    }
}

/// Inactive period between normal-mode conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Standby {
    Ms0_5,
    Ms10,
    Ms20,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    #[default]
    Ms1000,
}

impl Standby {
    fn bits(self) -> u8 {
        match self {
            Self::Ms0_5 => 0b000,
            Self::Ms62_5 => 0b001,
            Self::Ms125 => 0b010,
            Self::Ms250 => 0b011,
            Self::Ms500 => 0b100,
            Self::Ms1000 => 0b101,
            Self::Ms10 => 0b110,
            Self::Ms20 => 0b111,
        }
    }
}

/// How conversions are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorMode {
    /// Free-running; each read returns the latest finished conversion.
    #[default]
    Normal,
    /// One conversion per read, then back to sleep.
    Forced,
}

impl SensorMode {
    fn bits(self) -> u8 {
        match self {
            Self::Normal => 0b11,
            Self::Forced => 0b01,
        }
    }
}

/// Everything written to the control registers at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bme280Settings {
    pub temperature_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub humidity_oversampling: Oversampling,
    pub filter: Filter,
    pub standby: Standby,
    pub mode: SensorMode,
    /// Upper bound on the forced-mode `measuring` poll.
    pub measurement_timeout_ms: u32,
}

impl Default for Bme280Settings {
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            humidity_oversampling: Oversampling::X1,
            filter: Filter::Off,
            standby: Standby::Ms1000,
            mode: SensorMode::Normal,
            measurement_timeout_ms: 50,
        }
    }
}

impl Bme280Settings {
    pub fn ctrl_hum(&self) -> u8 {
        self.humidity_oversampling.bits()
    }

    /// `ctrl_meas` with the given power mode bits.
    fn ctrl_meas_with(&self, mode: u8) -> u8 {
        (self.temperature_oversampling.bits() << 5)
            | (self.pressure_oversampling.bits() << 2)
            | mode
    }

    /// `ctrl_meas` as written at open time.  Forced mode parks the sensor
    /// in sleep until the first trigger.
    pub fn ctrl_meas(&self) -> u8 {
        match self.mode {
            SensorMode::Normal => self.ctrl_meas_with(SensorMode::Normal.bits()),
            SensorMode::Forced => self.ctrl_meas_with(0b00),
        }
    }

    pub fn config(&self) -> u8 {
        (self.standby.bits() << 5) | (self.filter.bits() << 2)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Failed [`Bme280Session::open`]; hands the bus back so the caller can
/// retry later.
#[derive(Debug)]
pub struct OpenError<B> {
    pub bus: B,
    pub error: SensorError,
}

/// An identified, reset, configured and calibrated sensor.
pub struct Bme280Session<B> {
    bus: B,
    calibration: CalibrationSet,
    settings: Bme280Settings,
}

impl<B: RegisterBus> Bme280Session<B> {
    /// Bring the sensor up.  See the module docs for the sequence.
    pub fn open(
        mut bus: B,
        settings: Bme280Settings,
        delay: &mut impl DelayNs,
    ) -> Result<Self, OpenError<B>> {
        match Self::bring_up(&mut bus, &settings, delay) {
            Ok(calibration) => Ok(Self {
                bus,
                calibration,
                settings,
            }),
            Err(error) => Err(OpenError { bus, error }),
        }
    }

    fn bring_up(
        bus: &mut B,
        settings: &Bme280Settings,
        delay: &mut impl DelayNs,
    ) -> Result<CalibrationSet, SensorError> {
        bus.probe()?;

        let id = bus.read_byte(REG_CHIP_ID)?;
        if id != BME280_CHIP_ID {
            return Err(SensorError::WrongDevice { found: id });
        }

        bus.write_byte(REG_RESET, SOFT_RESET_CMD)?;
        delay.delay_ms(RESET_SETTLE_MS);
        wait_for_clear(bus, STATUS_IM_UPDATE, IM_UPDATE_POLLS, delay)?;

        let mut tp = [0u8; CALIB_TP_LEN];
        let mut hum = [0u8; CALIB_H_LEN];
        bus.read_block(REG_CALIB_TP, &mut tp)?;
        let h1 = bus.read_byte(REG_CALIB_H1)?;
        bus.read_block(REG_CALIB_H, &mut hum)?;
        let calibration = CalibrationSet::parse(&tp, h1, &hum)?;
        debug!("BME280 calibration: {:?}", calibration);

        bus.write_byte(REG_CTRL_HUM, settings.ctrl_hum())?;
        bus.write_byte(REG_CONFIG, settings.config())?;
        bus.write_byte(REG_CTRL_MEAS, settings.ctrl_meas())?;

        info!(
            "BME280 session open (ctrl_hum=0x{:02X} ctrl_meas=0x{:02X} config=0x{:02X})",
            settings.ctrl_hum(),
            settings.ctrl_meas(),
            settings.config()
        );
        Ok(calibration)
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    pub fn settings(&self) -> &Bme280Settings {
        &self.settings
    }

    /// One burst read of the data registers.  In forced mode this first
    /// triggers a conversion and waits for it, bounded by
    /// `measurement_timeout_ms`.
    pub fn read_raw(&mut self, delay: &mut impl DelayNs) -> Result<RawSample, SensorError> {
        if self.settings.mode == SensorMode::Forced {
            let trigger = self.settings.ctrl_meas_with(SensorMode::Forced.bits());
            self.bus.write_byte(REG_CTRL_MEAS, trigger)?;
            wait_for_clear(
                &mut self.bus,
                STATUS_MEASURING,
                self.settings.measurement_timeout_ms,
                delay,
            )?;
        }

        let mut data = [0u8; DATA_LEN];
        self.bus.read_block(REG_DATA, &mut data)?;
        Ok(RawSample::from_burst(&data))
    }

    /// Read and compensate one sample.
    pub fn measure(
        &mut self,
        delay: &mut impl DelayNs,
        mode: CompensationMode,
    ) -> Result<CompensatedChannels, SensorError> {
        let raw = self.read_raw(delay)?;
        Ok(compensation::compensate_channels(&raw, &self.calibration, mode))
    }

    /// Close the session and give the bus back.
    pub fn into_bus(self) -> B {
        self.bus
    }
}

/// Poll the status register until `mask` clears, 1 ms between polls.
fn wait_for_clear<B: RegisterBus>(
    bus: &mut B,
    mask: u8,
    polls: u32,
    delay: &mut impl DelayNs,
) -> Result<(), BusFault> {
    for _ in 0..=polls {
        if bus.read_byte(REG_STATUS)? & mask == 0 {
            return Ok(());
        }
        delay.delay_ms(1);
    }
    Err(BusFault::Timeout)
}
