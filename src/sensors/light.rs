//! BH1750-class ambient light sensor.
//!
//! Every read issues the continuous high-resolution command and fetches the
//! two-byte big-endian count.  `lux = count / 1.2`.

use embedded_hal::i2c::{Error as _, I2c};

use crate::error::BusFault;
use crate::registers::{LIGHT_CONTINUOUS_HIGH_RES, LIGHT_COUNTS_PER_LUX};

pub struct LightSensor<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> LightSensor<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn read_lux(&mut self) -> Result<f64, BusFault> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[LIGHT_CONTINUOUS_HIGH_RES], &mut buf)
            .map_err(|e| BusFault::from(e.kind()))?;
        Ok(f64::from(u16::from_be_bytes(buf)) / LIGHT_COUNTS_PER_LUX)
    }
}
