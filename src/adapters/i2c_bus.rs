//! I2C register bus adapter.
//!
//! Implements [`RegisterBus`] over any `embedded_hal::i2c::I2c` (rppal on the
//! Pi, a register-level mock in tests).  [`probe`](RegisterBus::probe)
//! walks the candidate address list in order and keeps the first one that
//! acknowledges.

use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info};

use crate::app::ports::RegisterBus;
use crate::error::BusFault;
use crate::registers::REG_CHIP_ID;

pub struct I2cBus<I2C> {
    i2c: I2C,
    candidates: heapless::Vec<u8, 4>,
    address: u8,
}

impl<I2C: I2c> I2cBus<I2C> {
    /// `candidates` is probed in order; only the first four are kept.
    pub fn new(i2c: I2C, candidates: &[u8]) -> Self {
        let candidates: heapless::Vec<u8, 4> = candidates.iter().copied().take(4).collect();
        let address = candidates.first().copied().unwrap_or(0);
        Self {
            i2c,
            candidates,
            address,
        }
    }

    /// Address of the device found by the last successful probe.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn fault<E: embedded_hal::i2c::Error>(e: E) -> BusFault {
    BusFault::from(e.kind())
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusFault> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(fault)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusFault> {
        self.i2c.write(self.address, &[register, value]).map_err(fault)
    }

    fn probe(&mut self) -> Result<(), BusFault> {
        let mut last = BusFault::NoAcknowledge;
        for &address in &self.candidates {
            let mut id = [0u8; 1];
            match self.i2c.write_read(address, &[REG_CHIP_ID], &mut id) {
                Ok(()) => {
                    if address != self.address {
                        info!("I2C device found at 0x{:02X}", address);
                    }
                    self.address = address;
                    return Ok(());
                }
                Err(e) => {
                    debug!("No device at 0x{:02X}: {:?}", address, e.kind());
                    last = fault(e);
                }
            }
        }
        Err(last)
    }
}

/// A bus that could not be opened at start-up.  Every transaction fails
/// with [`BusFault::Open`], so the pipeline runs on fallback data.
impl<B: RegisterBus> RegisterBus for Option<B> {
    fn read_block(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusFault> {
        self.as_mut()
            .ok_or(BusFault::Open)?
            .read_block(register, buf)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), BusFault> {
        self.as_mut()
            .ok_or(BusFault::Open)?
            .write_byte(register, value)
    }

    fn probe(&mut self) -> Result<(), BusFault> {
        self.as_mut().ok_or(BusFault::Open)?.probe()
    }
}
