//! Raw ADC sample assembly.
//!
//! The data registers 0xF7..=0xFE arrive as one 8-byte burst: pressure
//! (20 bits, MSB/LSB/XLSB), temperature (20 bits) and humidity (16 bits).
//! No validation happens here; garbage in is passed through to the
//! compensation engine and rejected after compensation.

use crate::registers::DATA_LEN;

/// Three unconverted ADC values from one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit temperature ADC value.
    pub adc_temperature: u32,
    /// 20-bit pressure ADC value.
    pub adc_pressure: u32,
    /// 16-bit humidity ADC value.
    pub adc_humidity: u32,
}

impl RawSample {
    /// Unpack a data-register burst.
    pub fn from_burst(data: &[u8; DATA_LEN]) -> Self {
        let b = data.map(u32::from);
        Self {
            adc_pressure: (b[0] << 12) | (b[1] << 4) | (b[2] >> 4),
            adc_temperature: (b[3] << 12) | (b[4] << 4) | (b[5] >> 4),
            adc_humidity: (b[6] << 8) | b[7],
        }
    }
}
