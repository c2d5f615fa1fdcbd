//! Outbound application events.
//!
//! The [`ReadingService`](super::service::ReadingService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to the console, post to the
//! ingestion endpoint, drive an LED.

use crate::error::SensorError;
use crate::reading::{FallbackReason, SensorRecord};
use crate::validation::Validator;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; carries the active degradation policy.
    Started(Validator),

    /// One assembled record per cycle.
    Record(SensorRecord),

    /// At least one core channel was synthesized this cycle.
    FallbackEngaged { cycle: u64, reason: FallbackReason },

    /// A sensor session was (re)opened and calibration read.
    SessionOpened,

    /// The open session failed and was dropped.
    SessionLost(SensorError),
}
