//! Runtime diagnostics.
//!
//! [`CycleStats`] counts cycles, fully-real records and fallbacks by
//! reason, and keeps the last [`HISTORY_LEN`] fallbacks in a fixed-size
//! ring so a long-running reader never grows its memory footprint.
//!
//! [`install_panic_handler`] routes panics through the logger so they land
//! next to the cycle log instead of only on stderr.

use heapless::Deque;

use crate::reading::{FallbackReason, Provenance, SensorRecord};

pub const HISTORY_LEN: usize = 8;

/// One remembered fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackEntry {
    pub cycle: u64,
    pub reason: FallbackReason,
}

#[derive(Debug, Clone)]
pub struct CycleStats {
    cycles: u64,
    real_records: u64,
    fallbacks: [u64; FallbackReason::ALL.len()],
    recent: Deque<FallbackEntry, HISTORY_LEN>,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub fn new() -> Self {
        Self {
            cycles: 0,
            real_records: 0,
            fallbacks: [0; FallbackReason::ALL.len()],
            recent: Deque::new(),
        }
    }

    /// Account for one assembled record.
    pub fn record(&mut self, cycle: u64, record: &SensorRecord) {
        self.cycles += 1;
        if record.source == Provenance::RealSensor {
            self.real_records += 1;
        }
        if let Some(reason) = record.fallback_reason {
            self.fallbacks[reason.index()] += 1;
            if self.recent.is_full() {
                self.recent.pop_front();
            }
            let _ = self.recent.push_back(FallbackEntry { cycle, reason });
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn real_records(&self) -> u64 {
        self.real_records
    }

    pub fn fallbacks(&self, reason: FallbackReason) -> u64 {
        self.fallbacks[reason.index()]
    }

    pub fn total_fallbacks(&self) -> u64 {
        self.fallbacks.iter().sum()
    }

    /// Oldest first.
    pub fn recent_fallbacks(&self) -> impl Iterator<Item = &FallbackEntry> {
        self.recent.iter()
    }
}

/// Log panics through the `log` facade, then defer to the default hook.
///
/// Call once during start-up, after the logger is installed.
pub fn install_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        match info.location() {
            Some(loc) => log::error!("PANIC at {}:{}: {}", loc.file(), loc.line(), reason),
            None => log::error!("PANIC: {}", reason),
        }
        default_hook(info);
    }));
}
