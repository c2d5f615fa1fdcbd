//! Application service: the hexagonal core.
//!
//! [`ReadingService`] owns the validator and the cycle statistics.  All I/O
//! flows through port traits injected at call sites, making the whole
//! pipeline testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!    AuxSource ──▶ │      ReadingService       │
//! Clock · Rand ──▶ │ validate · fall back · AQI│
//!                  └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::assembler;
use crate::config::{SensorConfig, validate_config};
use crate::diagnostics::CycleStats;
use crate::reading::SensorRecord;
use crate::validation::Validator;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{AuxSource, Clock, ConfigError, EventSink, RandomSource, SensorPort};

pub struct ReadingService {
    config: SensorConfig,
    validator: Validator,
    stats: CycleStats,
    cycle: u64,
}

impl ReadingService {
    pub fn new(config: SensorConfig) -> Self {
        let validator = Validator::from_config(&config);
        Self {
            config,
            validator,
            stats: CycleStats::new(),
            cycle: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the degradation policy before the first cycle.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let w = &self.validator.window;
        let p = &self.validator.policy;
        info!(
            "ReadingService started; readings with temperature outside [{:.1}, {:.1}]\u{00b0}C \
             or from an unreachable sensor are REPLACED by synthetic values \
             (T {:.1}\u{00b1}{:.1}\u{00b0}C, RH {:.1}\u{00b1}{:.1}%, P {:.2}\u{00b1}{:.1} hPa) \
             tagged fallback-synthetic",
            w.min_celsius,
            w.max_celsius,
            p.temperature_celsius,
            p.temperature_spread,
            p.humidity_percent,
            p.humidity_spread,
            p.pressure_hpa,
            p.pressure_spread,
        );
        sink.emit(&AppEvent::Started(self.validator));
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one polling cycle and return the emitted record.
    ///
    /// Never fails: every per-cycle error is logged, counted and replaced
    /// according to the degradation policy.
    pub fn cycle(
        &mut self,
        sensor: &mut impl SensorPort,
        aux: &mut impl AuxSource,
        clock: &impl Clock,
        rng: &mut impl RandomSource,
        sink: &mut impl EventSink,
    ) -> SensorRecord {
        self.cycle += 1;
        let cycle = self.cycle;

        // 1. Measure
        let was_open = sensor.is_session_open();
        let outcome = sensor.measure();
        let is_open = sensor.is_session_open();

        match (&outcome, was_open, is_open) {
            (Ok(_), _, true) if !was_open => sink.emit(&AppEvent::SessionOpened),
            (Err(e), true, false) => {
                warn!("cycle {}: sensor session lost: {}", cycle, e);
                sink.emit(&AppEvent::SessionLost(*e));
            }
            (Err(e), _, _) => warn!("cycle {}: sensor unavailable: {}", cycle, e),
            _ => {}
        }

        // 2. Validate or fall back
        let validated = self.validator.resolve(outcome, rng);
        if let Some(reason) = validated.fallback_reason {
            warn!("cycle {}: fallback engaged ({})", cycle, reason);
            sink.emit(&AppEvent::FallbackEngaged { cycle, reason });
        }

        // 3. Auxiliary channels
        let aux = self
            .validator
            .complete_aux(aux.read(), clock.local_hour(), rng);

        // 4. Assemble and emit
        let record = assembler::assemble(&validated, &aux, clock.now());
        self.stats.record(cycle, &record);
        sink.emit(&AppEvent::Record(record.clone()));
        record
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        sensor: &mut impl SensorPort,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::UpdateConfig(new_config) => {
                if let Err(e) = validate_config(&new_config) {
                    warn!("Rejected configuration update: {}", e);
                    return Err(e);
                }
                self.validator = Validator::from_config(&new_config);
                sensor.reconfigure(&new_config);
                self.config = new_config;
                info!("Configuration updated at runtime");
            }
            AppCommand::ResetSession => {
                sensor.reset_session();
                info!("Sensor session reset requested");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn cycle_count(&self) -> u64 {
        self.cycle
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }
}
