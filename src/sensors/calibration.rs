//! BME280 factory calibration coefficients.
//!
//! The sensor ships with per-unit trimming constants in two non-contiguous
//! NVM areas, plus `H1` in a byte of its own at 0xA1.
//! [`CalibrationSet::parse`] turns them into named, sign-corrected
//! coefficients.  Parsing fails closed: a short block is an
//! error, never a zero-filled coefficient.
//!
//! ## Layout
//!
//! | Block | Offset | Coefficient |
//! |-------|--------|-------------|
//! | T/P   | 0..6   | `T1` (u16), `T2`, `T3` |
//! | T/P   | 6..24  | `P1` (u16), `P2`..`P9` |
//! | 0xA1  | -      | `H1` (u8) |
//! | H     | 0..2   | `H2` |
//! | H     | 2      | `H3` (u8) |
//! | H     | 3..6   | `H4`, `H5` (12-bit, nibble-packed) |
//! | H     | 6      | `H6` (i8) |

use crate::error::{CalibrationBlock, SensorError};
use crate::registers::{CALIB_H_LEN, CALIB_TP_LEN};

/// Named coefficients for one physical sensor.  Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSet {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,

    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,

    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

impl CalibrationSet {
    /// Parse the 0x88..=0x9F burst (`tp`, at least 24 bytes), the `H1`
    /// byte from 0xA1 and the 0xE1..=0xE7 burst (`hum`, at least 7 bytes).
    ///
    /// Extra trailing bytes are ignored.  Either block being short yields
    /// [`SensorError::CalibrationParse`].
    pub fn parse(tp: &[u8], h1: u8, hum: &[u8]) -> Result<Self, SensorError> {
        let tp = require(tp, CALIB_TP_LEN, CalibrationBlock::TemperaturePressure)?;
        let hum = require(hum, CALIB_H_LEN, CalibrationBlock::Humidity)?;

        Ok(Self {
            t1: unsigned(tp, 0),
            t2: signed(tp, 2),
            t3: signed(tp, 4),

            p1: unsigned(tp, 6),
            p2: signed(tp, 8),
            p3: signed(tp, 10),
            p4: signed(tp, 12),
            p5: signed(tp, 14),
            p6: signed(tp, 16),
            p7: signed(tp, 18),
            p8: signed(tp, 20),
            p9: signed(tp, 22),

            h1,
            h2: signed(hum, 0),
            h3: hum[2],
            h4: pack_h4(hum[3], hum[4]),
            h5: pack_h5(hum[4], hum[5]),
            h6: hum[6] as i8,
        })
    }
}

fn require(block: &[u8], needed: usize, which: CalibrationBlock) -> Result<&[u8], SensorError> {
    if block.len() < needed {
        return Err(SensorError::CalibrationParse {
            block: which,
            needed,
            found: block.len(),
        });
    }
    Ok(&block[..needed])
}

fn unsigned(block: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([block[at], block[at + 1]])
}

/// Little-endian two's-complement: a raw value above 32767 becomes
/// `raw - 65536`.
fn signed(block: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([block[at], block[at + 1]])
}

/// `H4 = E4[7:0] << 4 | E5[3:0]`.  The MSB byte is sign-extended, so the
/// 12-bit value carries the sign of 0xE4.
pub(crate) fn pack_h4(msb: u8, shared: u8) -> i16 {
    (i16::from(msb as i8) << 4) | i16::from(shared & 0x0F)
}

/// `H5 = E6[7:0] << 4 | E5[7:4]`, sign taken from 0xE6.
pub(crate) fn pack_h5(shared: u8, msb: u8) -> i16 {
    (i16::from(msb as i8) << 4) | i16::from(shared >> 4)
}
