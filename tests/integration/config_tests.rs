//! Config file → service: load, hot update, rejection.

use std::fs;

use envirosense::adapters::config_file::FileConfigAdapter;
use envirosense::app::commands::AppCommand;
use envirosense::app::ports::{ConfigError, ConfigPort, SensorPort};
use envirosense::app::service::ReadingService;
use envirosense::config::SensorConfig;
use envirosense::reading::Provenance;
use envirosense::sensors::AuxHub;
use envirosense::sensors::bme280::SensorMode;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::mock_hw::*;

#[test]
fn partial_file_overrides_only_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("envirosense.json");
    fs::write(
        &path,
        r#"{ "mode": "forced", "i2c_addresses": [119, 118], "temperature_offset_c": -1.0 }"#,
    )
    .unwrap();

    let config = FileConfigAdapter::new(&path).load().unwrap();
    assert_eq!(config.mode, SensorMode::Forced);
    assert_eq!(config.i2c_addresses, [0x77, 0x76]);
    assert_eq!(config.poll_interval_secs, SensorConfig::default().poll_interval_secs);

    let i2c = MockI2c::new(MockChip::bme280(0x77));
    let mut sensor = adapter(&i2c, &config);
    let record = ReadingService::new(config).cycle(
        &mut sensor,
        &mut AuxHub::<MockI2c>::new(None),
        &FixedClock { hour: 12 },
        &mut StdRng::seed_from_u64(0),
        &mut EventLog::default(),
    );
    assert_eq!(record.source, Provenance::RealSensor);
    assert!((record.temperature_celsius.value - (REFERENCE_TEMPERATURE_C - 1.0)).abs() < 0.01);
}

#[test]
fn rejected_reload_leaves_running_config_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let port = FileConfigAdapter::new(dir.path().join("envirosense.json"));
    port.save(&SensorConfig::default()).unwrap();

    let i2c = MockI2c::new(MockChip::bme280(0x76));
    let config = port.load().unwrap();
    let mut sensor = adapter(&i2c, &config);
    let mut svc = ReadingService::new(config);
    svc.cycle(
        &mut sensor,
        &mut AuxHub::<MockI2c>::new(None),
        &FixedClock { hour: 12 },
        &mut StdRng::seed_from_u64(0),
        &mut EventLog::default(),
    );

    let inverted = SensorConfig {
        min_plausible_c: 40.0,
        max_plausible_c: 10.0,
        ..SensorConfig::default()
    };
    assert!(matches!(
        svc.handle_command(AppCommand::UpdateConfig(inverted), &mut sensor),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert_eq!(svc.config(), &SensorConfig::default());
    assert!(sensor.is_session_open());
}
