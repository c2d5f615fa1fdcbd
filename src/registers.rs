//! Bus addresses and register map for the Enviro board.
//!
//! Every driver references this module rather than hard-coding register
//! offsets.  Offsets follow the BME280 datasheet
//! (memory map, section 5.3) and the BH1750 command set.

// ---------------------------------------------------------------------------
// I2C addresses
// ---------------------------------------------------------------------------

/// BME280 with SDO tied to GND (the Enviro board default).
pub const BME280_ADDR_PRIMARY: u8 = 0x76;
/// BME280 with SDO tied to VDDIO.
pub const BME280_ADDR_SECONDARY: u8 = 0x77;
/// Ambient light sensor (ADDR pin low).
pub const LIGHT_SENSOR_ADDR: u8 = 0x23;

// ---------------------------------------------------------------------------
// BME280 identity and control
// ---------------------------------------------------------------------------

/// Chip identification register.
pub const REG_CHIP_ID: u8 = 0xD0;
/// Value of [`REG_CHIP_ID`] for a BME280 (a BMP280 reads 0x58).
pub const BME280_CHIP_ID: u8 = 0x60;

/// Writing [`SOFT_RESET_CMD`] here performs a power-on reset.
pub const REG_RESET: u8 = 0xE0;
pub const SOFT_RESET_CMD: u8 = 0xB6;

/// Humidity oversampling.  Only takes effect after a write to [`REG_CTRL_MEAS`].
pub const REG_CTRL_HUM: u8 = 0xF2;
/// Status: bit 3 = measuring, bit 0 = NVM image update in progress.
pub const REG_STATUS: u8 = 0xF3;
pub const STATUS_MEASURING: u8 = 0b0000_1000;
pub const STATUS_IM_UPDATE: u8 = 0b0000_0001;
/// Temperature/pressure oversampling and power mode.
pub const REG_CTRL_MEAS: u8 = 0xF4;
/// Standby time, IIR filter, 3-wire SPI enable.
pub const REG_CONFIG: u8 = 0xF5;

// ---------------------------------------------------------------------------
// BME280 calibration area
// ---------------------------------------------------------------------------

/// Start of the temperature/pressure block (`T1` low byte).
pub const REG_CALIB_TP: u8 = 0x88;
/// 0x88..=0x9F: `T1..T3, P1..P9`.  0xA0 is reserved.
pub const CALIB_TP_LEN: usize = 24;
/// `H1`, stored apart from the rest of the humidity trim.
pub const REG_CALIB_H1: u8 = 0xA1;
/// Start of the humidity block (`H2` low byte).
pub const REG_CALIB_H: u8 = 0xE1;
/// 0xE1..=0xE7: `H2..H6`.
pub const CALIB_H_LEN: usize = 7;

// ---------------------------------------------------------------------------
// BME280 data registers
// ---------------------------------------------------------------------------

/// `press_msb`; the burst continues through `hum_lsb` at 0xFE.
pub const REG_DATA: u8 = 0xF7;
pub const DATA_LEN: usize = 8;

// ---------------------------------------------------------------------------
// BH1750 light sensor
// ---------------------------------------------------------------------------

/// Continuous high-resolution mode (1 lx resolution, 120 ms conversion).
pub const LIGHT_CONTINUOUS_HIGH_RES: u8 = 0x10;
/// Datasheet conversion factor: lux = count / 1.2.
pub const LIGHT_COUNTS_PER_LUX: f64 = 1.2;
