//! Hardware adapter: bridges the BME280 session to the [`SensorPort`].
//!
//! Owns the register bus for the lifetime of the process and moves it in
//! and out of a [`Bme280Session`]:
//!
//! ```text
//!   Closed{wait=0} ──open ok──▶ Open ──measure err──▶ Closed{wait=0}
//!        ▲    │
//!        │    └──open err──▶ Closed{wait=session_retry_cycles}
//!        └── wait counts down one per cycle ──┘
//! ```
//!
//! While closed and waiting, `measure` returns the error that closed the
//! session without touching the bus.

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::ports::{RegisterBus, SensorPort};
use crate::config::SensorConfig;
use crate::error::{BusFault, SensorError};
use crate::sensors::bme280::{Bme280Session, Bme280Settings, OpenError};
use crate::sensors::compensation::{CompensatedChannels, CompensationMode};

enum Link<B> {
    Closed {
        bus: B,
        wait: u32,
        last_error: SensorError,
    },
    Open(Bme280Session<B>),
}

pub struct Bme280Adapter<B, D> {
    link: Option<Link<B>>,
    delay: D,
    settings: Bme280Settings,
    compensation: CompensationMode,
    temperature_offset_c: f64,
    retry_cycles: u32,
}

impl<B: RegisterBus, D: DelayNs> Bme280Adapter<B, D> {
    /// The first `measure` opens the session.
    pub fn new(bus: B, delay: D, config: &SensorConfig) -> Self {
        Self {
            link: Some(Link::Closed {
                bus,
                wait: 0,
                last_error: SensorError::BusUnavailable(BusFault::Open),
            }),
            delay,
            settings: config.bme280_settings(),
            compensation: config.compensation,
            temperature_offset_c: config.temperature_offset_c,
            retry_cycles: config.session_retry_cycles,
        }
    }

    fn step(&mut self, link: Link<B>) -> (Link<B>, Result<CompensatedChannels, SensorError>) {
        match link {
            Link::Closed {
                bus,
                wait,
                last_error,
            } if wait > 0 => (
                Link::Closed {
                    bus,
                    wait: wait - 1,
                    last_error,
                },
                Err(last_error),
            ),
            Link::Closed { bus, .. } => {
                match Bme280Session::open(bus, self.settings, &mut self.delay) {
                    Ok(session) => self.measure_open(session),
                    Err(OpenError { bus, error: e }) => {
                        if e.is_session_fatal() {
                            error!("BME280 calibration unusable, session refused: {}", e);
                        } else {
                            warn!(
                                "BME280 open failed: {}; retrying in {} cycles",
                                e, self.retry_cycles
                            );
                        }
                        let closed = Link::Closed {
                            bus,
                            wait: self.retry_cycles,
                            last_error: e,
                        };
                        (closed, Err(e))
                    }
                }
            }
            Link::Open(session) => self.measure_open(session),
        }
    }

    fn measure_open(
        &mut self,
        mut session: Bme280Session<B>,
    ) -> (Link<B>, Result<CompensatedChannels, SensorError>) {
        match session.measure(&mut self.delay, self.compensation) {
            Ok(channels) => (
                Link::Open(session),
                Ok(channels.with_temperature_offset(self.temperature_offset_c)),
            ),
            Err(e) => (
                Link::Closed {
                    bus: session.into_bus(),
                    wait: 0,
                    last_error: e,
                },
                Err(e),
            ),
        }
    }

    /// Release the bus (closing any open session).
    pub fn into_bus(self) -> Option<B> {
        match self.link? {
            Link::Closed { bus, .. } => Some(bus),
            Link::Open(session) => Some(session.into_bus()),
        }
    }
}

impl<B: RegisterBus, D: DelayNs> SensorPort for Bme280Adapter<B, D> {
    fn measure(&mut self) -> Result<CompensatedChannels, SensorError> {
        let link = self
            .link
            .take()
            .ok_or(SensorError::BusUnavailable(BusFault::Other))?;
        let (link, result) = self.step(link);
        self.link = Some(link);
        result
    }

    fn reset_session(&mut self) {
        self.link = match self.link.take() {
            Some(Link::Open(session)) => {
                info!("BME280 session closed on request");
                Some(Link::Closed {
                    bus: session.into_bus(),
                    wait: 0,
                    last_error: SensorError::BusUnavailable(BusFault::Open),
                })
            }
            Some(Link::Closed {
                bus, last_error, ..
            }) => Some(Link::Closed {
                bus,
                wait: 0,
                last_error,
            }),
            None => None,
        };
    }

    fn is_session_open(&self) -> bool {
        matches!(self.link, Some(Link::Open(_)))
    }

    fn reconfigure(&mut self, config: &SensorConfig) {
        self.compensation = config.compensation;
        self.temperature_offset_c = config.temperature_offset_c;
        self.retry_cycles = config.session_retry_cycles;

        let settings = config.bme280_settings();
        if settings != self.settings {
            self.settings = settings;
            // New control register values only reach the sensor on open.
            self.reset_session();
        }
    }
}
