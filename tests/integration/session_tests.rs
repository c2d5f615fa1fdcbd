//! Session lifecycle across bus faults, runtime reconfiguration and reset.

use envirosense::app::commands::AppCommand;
use envirosense::app::events::AppEvent;
use envirosense::app::ports::SensorPort;
use envirosense::app::service::ReadingService;
use envirosense::config::SensorConfig;
use envirosense::error::{BusFault, SensorError};
use envirosense::reading::{FallbackReason, Provenance};
use envirosense::sensors::AuxHub;
use envirosense::sensors::bme280::SensorMode;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::mock_hw::*;

struct Rig {
    i2c: MockI2c,
    sensor: MockAdapter,
    svc: ReadingService,
    sink: EventLog,
    rng: StdRng,
}

impl Rig {
    fn new(config: SensorConfig) -> Self {
        let i2c = MockI2c::new(MockChip::bme280(0x76));
        let sensor = adapter(&i2c, &config);
        Self {
            i2c,
            sensor,
            svc: ReadingService::new(config),
            sink: EventLog::default(),
            rng: StdRng::seed_from_u64(42),
        }
    }

    fn cycle(&mut self) -> envirosense::reading::SensorRecord {
        self.svc.cycle(
            &mut self.sensor,
            &mut AuxHub::<MockI2c>::new(None),
            &FixedClock { hour: 12 },
            &mut self.rng,
            &mut self.sink,
        )
    }
}

#[test]
fn pulled_bus_falls_back_then_recovers_after_retry_wait() {
    let mut rig = Rig::new(SensorConfig {
        session_retry_cycles: 1,
        ..SensorConfig::default()
    });

    // 1: healthy
    assert_eq!(rig.cycle().source, Provenance::RealSensor);

    // 2: mid-session failure drops the session
    rig.i2c.chip().unplugged = true;
    let lost = rig.cycle();
    assert_eq!(lost.source, Provenance::FallbackSynthetic);
    assert_eq!(lost.fallback_reason, Some(FallbackReason::BusUnavailable));
    assert!(!rig.sensor.is_session_open());
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::SessionLost(SensorError::BusUnavailable(BusFault::NoAcknowledge))
        )),
        1
    );

    // 3: reopen attempt fails, starts the retry wait
    assert_eq!(rig.cycle().source, Provenance::FallbackSynthetic);

    // 4: still waiting; the bus is not touched even though it is back
    rig.i2c.chip().unplugged = false;
    let writes_before = rig.i2c.chip().writes.len();
    assert_eq!(rig.cycle().source, Provenance::FallbackSynthetic);
    assert_eq!(rig.i2c.chip().writes.len(), writes_before);

    // 5: reopened
    let recovered = rig.cycle();
    assert_eq!(recovered.source, Provenance::RealSensor);
    assert!((recovered.temperature_celsius.value - REFERENCE_TEMPERATURE_C).abs() < 0.01);

    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SessionOpened)), 2);
    let stats = rig.svc.stats();
    assert_eq!(stats.cycles(), 5);
    assert_eq!(stats.real_records(), 2);
    assert_eq!(stats.fallbacks(FallbackReason::BusUnavailable), 3);
    let recent: Vec<u64> = stats.recent_fallbacks().map(|f| f.cycle).collect();
    assert_eq!(recent, vec![2, 3, 4]);
}

#[test]
fn every_reopen_rereads_calibration() {
    let mut rig = Rig::new(SensorConfig::default());
    rig.cycle();

    // Corrupt the trim so a fresh calibration read would be visible.
    rig.i2c.chip().regs[0x88] = 0x00;
    rig.i2c.chip().regs[0x89] = 0x00;
    let same = rig.cycle();
    assert!((same.temperature_celsius.value - REFERENCE_TEMPERATURE_C).abs() < 0.01);

    rig.svc
        .handle_command(AppCommand::ResetSession, &mut rig.sensor)
        .unwrap();
    // T1 = 0 puts the compensated temperature far outside the window.
    let reread = rig.cycle();
    assert_eq!(reread.fallback_reason, Some(FallbackReason::OutOfRange));
}

#[test]
fn mode_change_at_runtime_reopens_with_new_registers() {
    let mut rig = Rig::new(SensorConfig::default());
    assert_eq!(rig.cycle().source, Provenance::RealSensor);
    assert!(rig.sensor.is_session_open());

    let forced = SensorConfig {
        mode: SensorMode::Forced,
        ..SensorConfig::default()
    };
    rig.svc
        .handle_command(AppCommand::UpdateConfig(forced), &mut rig.sensor)
        .unwrap();
    assert!(!rig.sensor.is_session_open());

    assert_eq!(rig.cycle().source, Provenance::RealSensor);
    assert_eq!(rig.i2c.chip().writes_to(0xF4), vec![0x27, 0x24, 0x25]);
    assert_eq!(rig.svc.config().mode, SensorMode::Forced);
}

#[test]
fn validator_only_update_keeps_session_open() {
    let mut rig = Rig::new(SensorConfig::default());
    rig.cycle();

    let tighter = SensorConfig {
        max_plausible_c: 20.0,
        fallback_temperature_c: 15.0,
        ..SensorConfig::default()
    };
    rig.svc
        .handle_command(AppCommand::UpdateConfig(tighter), &mut rig.sensor)
        .unwrap();
    assert!(rig.sensor.is_session_open());

    let record = rig.cycle();
    assert_eq!(record.fallback_reason, Some(FallbackReason::OutOfRange));
    // Only the initial open reset the chip.
    assert_eq!(rig.i2c.chip().writes_to(0xE0), vec![0xB6]);
}
