//! System clock adapter.
//!
//! Timestamps are UTC; the day/night decision for synthetic light uses the
//! board's local time zone.

use chrono::{DateTime, Local, Timelike, Utc};

use crate::app::ports::Clock;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_hour(&self) -> u8 {
        Local::now().hour() as u8
    }
}
