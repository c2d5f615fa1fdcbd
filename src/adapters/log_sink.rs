//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! `log` facade (stderr via `env_logger` on the Pi).  Each record is also
//! written as one JSON line at `debug` level for downstream scrapers.  An
//! HTTP or MQTT publisher would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Record(r) => {
                info!(
                    "RECORD | {} | T={:.1}\u{00b0}C ({}) | RH={:.1}% ({}) | P={:.2}hPa ({}) | \
                     gas={:.0}\u{03a9} light={:.0}lx noise={:.0}dB | AQI={:.1}",
                    r.source,
                    r.temperature_celsius.value,
                    r.temperature_celsius.source,
                    r.humidity_percent.value,
                    r.humidity_percent.source,
                    r.pressure_hpa.value,
                    r.pressure_hpa.source,
                    r.gas_ohms.value,
                    r.light_lux.value,
                    r.noise_db.value,
                    r.air_quality_index,
                );
                match serde_json::to_string(r) {
                    Ok(json) => debug!("{}", json),
                    Err(e) => warn!("Record serialisation failed: {}", e),
                }
            }
            AppEvent::FallbackEngaged { cycle, reason } => {
                warn!("FALLBACK | cycle={} reason={}", cycle, reason);
            }
            AppEvent::SessionOpened => {
                info!("SESSION | opened");
            }
            AppEvent::SessionLost(e) => {
                warn!("SESSION | lost: {}", e);
            }
            AppEvent::Started(v) => {
                info!(
                    "START | window=[{:.1}, {:.1}]\u{00b0}C",
                    v.window.min_celsius, v.window.max_celsius
                );
            }
        }
    }
}
