//! End-to-end cycles: bus → session → compensation → validator → record.

use envirosense::app::events::AppEvent;
use envirosense::app::service::ReadingService;
use envirosense::assembler::air_quality_index;
use envirosense::config::SensorConfig;
use envirosense::reading::{FallbackReason, Provenance};
use envirosense::sensors::AuxHub;
use envirosense::sensors::bme280::SensorMode;
use envirosense::sensors::compensation::CompensationMode;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::mock_hw::*;

fn no_aux() -> AuxHub<MockI2c> {
    AuxHub::new(None)
}

#[test]
fn reference_chip_at_secondary_address_yields_real_record() {
    let i2c = MockI2c::new(MockChip::bme280(0x77));
    let config = SensorConfig::default();
    let mut sensor = adapter(&i2c, &config);
    let mut aux = no_aux();
    aux.supply_gas(300_000.0);

    let mut svc = ReadingService::new(config);
    let mut sink = EventLog::default();
    let mut rng = StdRng::seed_from_u64(7);
    svc.start(&mut sink);

    let record = svc.cycle(&mut sensor, &mut aux, &FixedClock { hour: 12 }, &mut rng, &mut sink);

    assert_eq!(record.source, Provenance::RealSensor);
    assert_eq!(record.fallback_reason, None);
    assert!((record.temperature_celsius.value - REFERENCE_TEMPERATURE_C).abs() < 0.01);
    assert!((record.pressure_hpa.value - REFERENCE_PRESSURE_HPA).abs() < 0.01);
    assert!((record.humidity_percent.value - REFERENCE_HUMIDITY_PERCENT).abs() < 0.01);

    assert_eq!(record.gas_ohms.value, 300_000.0);
    assert_eq!(record.gas_ohms.source, Provenance::RealSensor);
    let expected_aqi = air_quality_index(
        300_000.0,
        record.temperature_celsius.value,
        record.humidity_percent.value,
    );
    assert_eq!(record.air_quality_index, expected_aqi);

    assert!(matches!(sink.events[0], AppEvent::Started(_)));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SessionOpened)), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Record(_))), 1);

    // Board defaults reached the chip.
    let chip = i2c.chip();
    assert_eq!(chip.writes_to(0xF2), vec![0x01]);
    assert_eq!(chip.writes_to(0xF5), vec![0xA0]);
    assert_eq!(chip.writes_to(0xF4), vec![0x27]);
}

#[test]
fn fixed_point_matches_floating_point_within_resolution() {
    let i2c = MockI2c::new(MockChip::bme280(0x76));
    let mut rng = StdRng::seed_from_u64(1);
    let clock = FixedClock { hour: 12 };

    let mut read_with = |compensation: CompensationMode| {
        let config = SensorConfig {
            compensation,
            ..SensorConfig::default()
        };
        let mut sensor = adapter(&i2c, &config);
        ReadingService::new(config).cycle(
            &mut sensor,
            &mut no_aux(),
            &clock,
            &mut rng,
            &mut EventLog::default(),
        )
    };

    let float = read_with(CompensationMode::FloatingPoint);
    let fixed = read_with(CompensationMode::FixedPoint);

    assert_eq!(fixed.source, Provenance::RealSensor);
    assert!((fixed.temperature_celsius.value - float.temperature_celsius.value).abs() < 0.01);
    assert!((fixed.pressure_hpa.value - float.pressure_hpa.value).abs() < 0.05);
    assert!((fixed.humidity_percent.value - float.humidity_percent.value).abs() < 0.1);
}

#[test]
fn wrong_chip_id_is_never_configured_and_falls_back() {
    let mut chip = MockChip::bme280(0x76);
    chip.regs[0xD0] = 0x58;
    let i2c = MockI2c::new(chip);
    let config = SensorConfig::default();
    let mut sensor = adapter(&i2c, &config);
    let mut svc = ReadingService::new(config);
    let mut sink = EventLog::default();
    let mut rng = StdRng::seed_from_u64(3);

    let record = svc.cycle(
        &mut sensor,
        &mut no_aux(),
        &FixedClock { hour: 12 },
        &mut rng,
        &mut sink,
    );

    assert_eq!(record.source, Provenance::FallbackSynthetic);
    assert_eq!(record.fallback_reason, Some(FallbackReason::WrongDevice));
    assert!((22.0..=28.0).contains(&record.temperature_celsius.value));
    assert!((40.0..=60.0).contains(&record.humidity_percent.value));
    assert!((1003.25..=1023.25).contains(&record.pressure_hpa.value));
    assert!(i2c.chip().writes.is_empty());
    assert_eq!(svc.stats().fallbacks(FallbackReason::WrongDevice), 1);
}

#[test]
fn implausible_temperature_is_replaced_not_clamped() {
    let i2c = MockI2c::new(MockChip::bme280(0x76));
    let config = SensorConfig {
        max_plausible_c: 20.0,
        fallback_temperature_c: 15.0,
        ..SensorConfig::default()
    };
    let mut sensor = adapter(&i2c, &config);
    let mut svc = ReadingService::new(config);
    let mut sink = EventLog::default();
    let mut rng = StdRng::seed_from_u64(11);

    let record = svc.cycle(
        &mut sensor,
        &mut no_aux(),
        &FixedClock { hour: 12 },
        &mut rng,
        &mut sink,
    );

    assert_eq!(record.fallback_reason, Some(FallbackReason::OutOfRange));
    assert!(!record.temperature_celsius.is_real());
    assert!(!record.pressure_hpa.is_real());
    assert!((12.0..=18.0).contains(&record.temperature_celsius.value));
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::FallbackEngaged {
                cycle: 1,
                reason: FallbackReason::OutOfRange
            }
        )),
        1
    );
}

#[test]
fn temperature_offset_applies_before_validation() {
    let i2c = MockI2c::new(MockChip::bme280(0x76));
    let config = SensorConfig {
        temperature_offset_c: -2.0,
        ..SensorConfig::default()
    };
    let mut sensor = adapter(&i2c, &config);
    let record = ReadingService::new(config).cycle(
        &mut sensor,
        &mut no_aux(),
        &FixedClock { hour: 12 },
        &mut StdRng::seed_from_u64(0),
        &mut EventLog::default(),
    );
    assert!((record.temperature_celsius.value - (REFERENCE_TEMPERATURE_C - 2.0)).abs() < 0.01);
    assert!(record.temperature_celsius.is_real());
}

#[test]
fn forced_mode_triggers_one_conversion_per_cycle() {
    let mut chip = MockChip::bme280(0x76);
    chip.busy_polls = 2;
    let i2c = MockI2c::new(chip);
    let config = SensorConfig {
        mode: SensorMode::Forced,
        ..SensorConfig::default()
    };
    let mut sensor = adapter(&i2c, &config);
    let mut svc = ReadingService::new(config);
    let mut sink = EventLog::default();
    let mut rng = StdRng::seed_from_u64(5);
    let clock = FixedClock { hour: 12 };

    for _ in 0..3 {
        let record = svc.cycle(&mut sensor, &mut no_aux(), &clock, &mut rng, &mut sink);
        assert_eq!(record.source, Provenance::RealSensor);
    }

    // Sleep once at open, then one trigger per cycle.
    assert_eq!(i2c.chip().writes_to(0xF4), vec![0x24, 0x25, 0x25, 0x25]);
}

#[test]
fn night_cycle_synthesizes_dark_light_level() {
    let i2c = MockI2c::new(MockChip::bme280(0x76));
    let config = SensorConfig::default();
    let mut sensor = adapter(&i2c, &config);
    let mut svc = ReadingService::new(config);
    let mut rng = StdRng::seed_from_u64(9);

    let record = svc.cycle(
        &mut sensor,
        &mut no_aux(),
        &FixedClock { hour: 2 },
        &mut rng,
        &mut EventLog::default(),
    );

    assert_eq!(record.source, Provenance::RealSensor);
    assert_eq!(record.light_lux.source, Provenance::FallbackSynthetic);
    assert!((0.0..=50.0).contains(&record.light_lux.value));
    assert!((30.0..=80.0).contains(&record.noise_db.value));
    assert!((0.0..=500.0).contains(&record.air_quality_index));
}
