//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the full pipeline
//! (I2C bus, BME280 session, validator, assembler) against a
//! register-level mock chip.  No real hardware required.

mod config_tests;
mod mock_hw;
mod pipeline_tests;
mod session_tests;
