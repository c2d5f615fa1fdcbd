//! Application core: pure domain logic, zero I/O.
//!
//! One polling cycle: measure → validate or fall back → complete the
//! auxiliary channels → assemble → emit.  All interaction with hardware,
//! time and randomness happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
