//! Mock hardware for integration tests.
//!
//! [`MockChip`] is a BME280 register file behind an `embedded_hal` I2C
//! bus.  It is shared through `Rc<RefCell<_>>` so a test can pull the
//! bus, swap the chip id or inspect the write history while the adapter
//! still owns its handle.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use envirosense::adapters::hardware::Bme280Adapter;
use envirosense::adapters::i2c_bus::I2cBus;
use envirosense::app::events::AppEvent;
use envirosense::app::ports::{Clock, EventSink};
use envirosense::config::SensorConfig;

// ── Register image ────────────────────────────────────────────

const REG_CHIP_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_STATUS: u8 = 0xF3;
const REG_CTRL_MEAS: u8 = 0xF4;

/// BMP280 datasheet T/P trim (section 3.12) plus `H1` at 0xA1.
const TP_BLOCK: [u8; 26] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C,
    0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17, 0x00, 0x4B,
];
const H_BLOCK: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];
/// adc_P=415148, adc_T=519888, adc_H=30000.
const DATA_BURST: [u8; 8] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];

pub const REFERENCE_TEMPERATURE_C: f64 = 25.08;
pub const REFERENCE_PRESSURE_HPA: f64 = 1006.53;
pub const REFERENCE_HUMIDITY_PERCENT: f64 = 55.0;

// ── MockChip ──────────────────────────────────────────────────

pub struct MockChip {
    pub address: u8,
    pub regs: [u8; 256],
    /// Register writes in order, `(register, value)`.
    pub writes: Vec<(u8, u8)>,
    /// When set, nothing on the bus acknowledges.
    pub unplugged: bool,
    /// Busy status reads reported after each ctrl_meas or reset write.
    pub busy_polls: u32,
    busy_left: u32,
}

#[allow(dead_code)]
impl MockChip {
    pub fn bme280(address: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[REG_CHIP_ID as usize] = 0x60;
        regs[0x88..0x88 + TP_BLOCK.len()].copy_from_slice(&TP_BLOCK);
        regs[0xE1..0xE1 + H_BLOCK.len()].copy_from_slice(&H_BLOCK);
        regs[0xF7..0xF7 + DATA_BURST.len()].copy_from_slice(&DATA_BURST);
        Self {
            address,
            regs,
            writes: Vec::new(),
            unplugged: false,
            busy_polls: 0,
            busy_left: 0,
        }
    }

    pub fn writes_to(&self, register: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == register)
            .map(|(_, v)| *v)
            .collect()
    }

    fn read_register(&mut self, register: u8) -> u8 {
        if register == REG_STATUS {
            if self.busy_left > 0 {
                self.busy_left -= 1;
                return 0b0000_1001;
            }
            return 0;
        }
        self.regs[register as usize]
    }

    fn write_register(&mut self, register: u8, value: u8) {
        self.writes.push((register, value));
        if register == REG_CTRL_MEAS || register == REG_RESET {
            self.busy_left = self.busy_polls;
        }
        if register != REG_RESET {
            self.regs[register as usize] = value;
        }
    }
}

/// Cloneable I2C handle onto a shared [`MockChip`].
#[derive(Clone)]
pub struct MockI2c(pub Rc<RefCell<MockChip>>);

#[allow(dead_code)]
impl MockI2c {
    pub fn new(chip: MockChip) -> Self {
        Self(Rc::new(RefCell::new(chip)))
    }

    pub fn chip(&self) -> std::cell::RefMut<'_, MockChip> {
        self.0.borrow_mut()
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        let mut chip = self.0.borrow_mut();
        if chip.unplugged || address != chip.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        let mut pointer = 0u8;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&register, values)) = bytes.split_first() else {
                        continue;
                    };
                    pointer = register;
                    for &value in values {
                        chip.write_register(pointer, value);
                        pointer = pointer.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = chip.read_register(pointer);
                        pointer = pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub type MockAdapter = Bme280Adapter<I2cBus<MockI2c>, NoDelay>;

/// Adapter over the shared chip, probing the addresses in `config`.
pub fn adapter(i2c: &MockI2c, config: &SensorConfig) -> MockAdapter {
    Bme280Adapter::new(
        I2cBus::new(i2c.clone(), &config.i2c_addresses),
        NoDelay,
        config,
    )
}

// ── Clock and sink ────────────────────────────────────────────

pub struct FixedClock {
    pub hour: u8,
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, u32::from(self.hour), 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn local_hour(&self) -> u8 {
        self.hour
    }
}

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
