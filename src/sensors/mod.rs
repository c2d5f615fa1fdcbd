//! Sensor subsystem: the BME280 core pipeline and the auxiliary [`AuxHub`].
//!
//! ```text
//!  bus burst ──▶ raw ──▶ compensation ──▶ CompensatedChannels
//!                  ▲            ▲
//!              bme280 ──▶ calibration
//! ```

pub mod bme280;
pub mod calibration;
pub mod compensation;
pub mod fixed_point;
pub mod light;
pub mod raw;

use embedded_hal::i2c::I2c;
use log::debug;

use crate::app::ports::AuxSource;
use crate::reading::AuxReadings;
use light::LightSensor;

/// Aggregates the auxiliary channels.
///
/// Light comes from an optional on-board sensor.  Gas resistance and noise
/// have no driver on this board; other processes hand them in through
/// [`supply_gas`](Self::supply_gas) / [`supply_noise`](Self::supply_noise)
/// and each supplied value is consumed by the next read.
pub struct AuxHub<I2C> {
    light: Option<LightSensor<I2C>>,
    gas_ohms: Option<f64>,
    noise_db: Option<f64>,
}

impl<I2C: I2c> AuxHub<I2C> {
    pub fn new(light: Option<LightSensor<I2C>>) -> Self {
        Self {
            light,
            gas_ohms: None,
            noise_db: None,
        }
    }

    pub fn supply_gas(&mut self, ohms: f64) {
        self.gas_ohms = Some(ohms);
    }

    pub fn supply_noise(&mut self, db: f64) {
        self.noise_db = Some(db);
    }
}

impl<I2C: I2c> AuxSource for AuxHub<I2C> {
    fn read(&mut self) -> AuxReadings {
        let light_lux = match self.light.as_mut().map(LightSensor::read_lux) {
            Some(Ok(lux)) => Some(lux),
            Some(Err(fault)) => {
                debug!("Light sensor read failed: {}", fault);
                None
            }
            None => None,
        };

        AuxReadings {
            gas_ohms: self.gas_ohms.take(),
            light_lux,
            noise_db: self.noise_db.take(),
        }
    }
}
