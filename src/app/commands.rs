//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (signal handler,
//! config watcher, operator console) that the
//! [`ReadingService`](super::service::ReadingService) interprets and acts
//! upon.

use crate::config::SensorConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(SensorConfig),

    /// Drop the sensor session so the next cycle resets the sensor and
    /// re-reads calibration.
    ResetSession,
}
