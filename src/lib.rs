//! EnviroSense library.
//!
//! BME280 calibration, compensation, validation and fallback for the
//! Raspberry Pi environmental board.  Everything here runs on the host;
//! only the binary needs the `rpi` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod reading;
pub mod registers;
pub mod sensors;
pub mod validation;

pub use error::{BusFault, SensorError};
