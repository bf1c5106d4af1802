//! Dew heater control cycle against mock hardware and storage.
//!
//! Covers the first-run bootstrap, forced heating, the dew-point limit and
//! the failure paths that must leave the relay untouched.

use allsky_modules::adapters::hardware::HardwareAdapter;
use allsky_modules::app::events::AppEvent;
use allsky_modules::app::marker;
use allsky_modules::app::ports::{RelayPort, SensorPort};
use allsky_modules::app::service::{
    DewHeaterService, EXPORT_AMBIENT, EXPORT_DEW_POINT, EXPORT_HEATER, EXPORT_HUMIDITY,
    PIN_INVALID_MESSAGE,
};
use allsky_modules::config::{DewHeaterConfig, HeaterState, Params, SensorKind};
use allsky_modules::drivers::relay::RelayState;
use allsky_modules::pins::PinId;
use allsky_modules::sensors::Reading;
use allsky_modules::{ModuleOutput, Status};

use super::mock_hw::{FixedClock, MockHardware, MockStore, RecordingSink, RelayCall};

const NOW: u64 = 1_697_142_569;

fn config(force_c: f32, limit_c: f32) -> DewHeaterConfig {
    DewHeaterConfig {
        sensor_kind: SensorKind::Sht31,
        heater_pin: PinId::new(17),
        force_c,
        limit_c,
        ..DewHeaterConfig::default()
    }
}

/// A store that already carries the run marker.
fn warm_store() -> MockStore {
    let mut store = MockStore::new();
    marker::record(&mut store, NOW - 60).unwrap();
    store
}

/// One invocation straight from host options, as the binary runs it.
fn run_options(
    params: &Params,
    hw: &mut (impl SensorPort + RelayPort),
    store: &mut MockStore,
    sink: &mut RecordingSink,
) -> ModuleOutput {
    DewHeaterService::new(DewHeaterConfig::from_params(params)).run(
        hw,
        store,
        &FixedClock(NOW),
        sink,
    )
}

fn pin17(active: bool) -> RelayCall {
    RelayCall {
        pin: PinId::new(17).unwrap(),
        active,
        inverted: false,
    }
}

// ── Invalid pin ───────────────────────────────────────────────

#[test]
fn invalid_pin_is_terminal_and_touches_nothing() {
    for raw in ["", "0", "GPIO17", "-3"] {
        let params: Params = [("type", "SHT31"), ("heaterpin", raw), ("force", "10")]
            .into_iter()
            .collect();
        let mut hw = MockHardware::reading(5.0, 90.0);
        let mut store = MockStore::new();
        let mut sink = RecordingSink::new();

        let out = run_options(&params, &mut hw, &mut store, &mut sink);

        assert_eq!(out.status, Status::Error(PIN_INVALID_MESSAGE.into()), "pin {:?}", raw);
        assert!(hw.calls.is_empty());
        assert!(hw.reads.is_empty());
        assert_eq!(store.writes, 0, "no marker on a configuration error");
        assert_eq!(sink.events, vec![AppEvent::HeaterPinInvalid]);
    }
}

#[test]
fn invalid_pin_wins_over_every_malformed_option() {
    let malformed = [
        ("limit", "99"),
        ("force", "cold"),
        ("type", "AM2302"),
        ("heaterstartupstate", "maybe"),
        ("invertrelay", "perhaps"),
        ("frequency", "-1"),
        ("max", "999999"),
        ("i2caddress", "0xZZ"),
        ("inputpin", "GPIO4"),
    ];
    let singles = malformed.iter().map(|&pair| vec![pair]);
    for options in singles.chain([malformed.to_vec()]) {
        let params: Params = options
            .iter()
            .copied()
            .chain([("heaterpin", "0")])
            .collect();
        let mut hw = MockHardware::reading(5.0, 90.0);
        let mut store = MockStore::new();
        let mut sink = RecordingSink::new();

        let out = run_options(&params, &mut hw, &mut store, &mut sink);

        assert_eq!(
            out.status,
            Status::Error(PIN_INVALID_MESSAGE.into()),
            "{:?}",
            options
        );
        assert!(hw.calls.is_empty());
        assert!(hw.reads.is_empty());
        assert_eq!(store.writes, 0);
    }
}

// ── First run ─────────────────────────────────────────────────

#[test]
fn first_run_applies_startup_state_and_writes_marker() {
    let mut cfg = config(10.0, 2.0);
    cfg.startup_state = HeaterState::On;
    let service = DewHeaterService::new(cfg);

    // This sample alone would switch the heater off.
    let mut hw = MockHardware::reading(30.0, 10.0);
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert_eq!(hw.calls, vec![pin17(true)]);
    assert!(hw.reads.is_empty(), "sensor must not be read on first run");
    assert_eq!(out.status, Status::Silent);
    assert_eq!(out.exports[EXPORT_HEATER], "On");
    assert_eq!(marker::load(&store), Ok(Some(NOW)));
}

#[test]
fn first_run_with_unknown_sensor_type_still_bootstraps() {
    let params: Params = [
        ("type", "AM2302"),
        ("heaterpin", "17"),
        ("heaterstartupstate", "ON"),
    ]
    .into_iter()
    .collect();
    let mut hw = MockHardware::reading(30.0, 10.0);
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    let out = run_options(&params, &mut hw, &mut store, &mut sink);

    assert_eq!(hw.calls, vec![pin17(true)]);
    assert!(hw.reads.is_empty());
    assert_eq!(out.exports[EXPORT_HEATER], "On");
    assert_eq!(marker::load(&store), Ok(Some(NOW)));
}

#[test]
fn unrecognised_startup_state_means_off() {
    let params: Params = [("heaterpin", "17"), ("heaterstartupstate", "maybe")]
        .into_iter()
        .collect();
    let mut hw = MockHardware::reading(30.0, 10.0);
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    let out = run_options(&params, &mut hw, &mut store, &mut sink);

    assert_eq!(hw.calls, vec![pin17(false)]);
    assert_eq!(out.exports[EXPORT_HEATER], "Off");
}

#[test]
fn unsupported_sensor_bootstraps_then_leaves_heater_alone() {
    for sensor in ["BME280-SPI", "AM2302"] {
        let params: Params = [
            ("type", sensor),
            ("heaterpin", "17"),
            ("heaterstartupstate", "ON"),
        ]
        .into_iter()
        .collect();
        let config = DewHeaterConfig::from_params(&params);
        let mut hw = HardwareAdapter::simulated(&config);
        let mut store = MockStore::new();
        let mut sink = RecordingSink::new();

        let first = run_options(&params, &mut hw, &mut store, &mut sink);
        assert_eq!(first.exports[EXPORT_HEATER], "On", "{}", sensor);
        assert_eq!(hw.relay().map(|r| r.state()), Some(RelayState::Energised));

        sink.events.clear();
        let second = run_options(&params, &mut hw, &mut store, &mut sink);
        assert_eq!(second.status, Status::Silent);
        assert!(second.exports.is_empty());
        assert_eq!(
            sink.events,
            vec![AppEvent::SensorFailed {
                kind: config.sensor_kind
            }]
        );
        assert_eq!(hw.relay().map(|r| r.state()), Some(RelayState::Energised));
    }
}

#[test]
fn second_run_reads_the_sensor() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::reading(20.0, 37.37);
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);
    service.run(&mut hw, &mut store, &FixedClock(NOW + 30), &mut sink);

    assert_eq!(hw.reads, vec![SensorKind::Sht31]);
    assert_eq!(hw.calls, vec![pin17(false), pin17(false)]);
    assert_eq!(store.writes, 1, "marker written exactly once");
    assert_eq!(marker::load(&store), Ok(Some(NOW)));
}

#[test]
fn marker_write_failure_is_logged_not_fatal() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::reading(20.0, 37.37);
    let mut store = MockStore::failing();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert!(!out.is_error());
    assert_eq!(hw.calls, vec![pin17(false)]);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::MarkerWriteFailed(_)))
    );
}

// ── Steady state ──────────────────────────────────────────────

#[test]
fn forced_level_turns_heater_on_regardless_of_humidity() {
    let service = DewHeaterService::new(config(10.0, 2.0));
    for humidity in [Some(5.0), Some(99.0), None] {
        let mut hw = MockHardware::new(Reading::new(Some(5.0), humidity));
        let mut store = warm_store();
        let mut sink = RecordingSink::new();

        let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

        assert_eq!(hw.calls, vec![pin17(true)]);
        assert_eq!(out.message(), "Temperature below forced level 10");
    }
}

#[test]
fn within_limit_turns_heater_on() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::reading(15.0, 93.74);
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert_eq!(hw.heater_on(), Some(true));
    assert_eq!(
        out.message(),
        "Temperature within limit temperature 15.0, limit 2, dewPoint 14.0"
    );
    assert_eq!(out.exports[EXPORT_AMBIENT], "15.0");
    assert_eq!(out.exports[EXPORT_HUMIDITY], "93.7");
    assert_eq!(out.exports[EXPORT_DEW_POINT], "14.0");
    assert_eq!(out.exports[EXPORT_HEATER], "On");
}

#[test]
fn outside_limit_turns_heater_off() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::reading(20.0, 37.37);
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert_eq!(hw.heater_on(), Some(false));
    assert_eq!(
        out.message(),
        "Temperature outside limit temperature 20.0, limit 2, dewPoint 5.0"
    );
    assert_eq!(out.exports[EXPORT_HEATER], "Off");
}

#[test]
fn inverted_relay_is_passed_through() {
    let mut cfg = config(10.0, 2.0);
    cfg.invert_relay = true;
    let service = DewHeaterService::new(cfg);
    let mut hw = MockHardware::reading(0.0, 50.0);
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert_eq!(
        hw.calls,
        vec![RelayCall {
            pin: PinId::new(17).unwrap(),
            active: true,
            inverted: true,
        }]
    );
}

// ── Sensor failures ───────────────────────────────────────────

#[test]
fn absent_temperature_leaves_heater_alone() {
    let service = DewHeaterService::new(config(10.0, 2.0));
    let mut hw = MockHardware::new(Reading::absent());
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(out.status, Status::Silent);
    assert!(out.exports.is_empty());
    assert_eq!(
        sink.events,
        vec![AppEvent::SensorFailed {
            kind: SensorKind::Sht31
        }]
    );
}

#[test]
fn missing_humidity_above_force_leaves_heater_alone() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::new(Reading::new(Some(12.0), None));
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let out = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(out.exports[EXPORT_AMBIENT], "12.0");
    assert!(!out.exports.contains_key(EXPORT_HEATER));
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn repeated_runs_give_identical_results() {
    let service = DewHeaterService::new(config(0.0, 2.0));
    let mut hw = MockHardware::reading(15.0, 93.74);
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let first = service.run(&mut hw, &mut store, &FixedClock(NOW), &mut sink);
    let second = service.run(&mut hw, &mut store, &FixedClock(NOW + 5), &mut sink);

    assert_eq!(first, second);
    assert_eq!(hw.calls, vec![pin17(true), pin17(true)]);
    assert_eq!(store.writes, 1);
}

// ── Options from the host ─────────────────────────────────────

#[test]
fn host_options_drive_the_cycle() {
    let params = Params::from_json(
        r#"{"type": "SHT31", "heaterpin": 17, "heaterstartupstate": "OFF",
            "invertrelay": false, "limit": 2, "force": 0, "frequency": 0, "max": 0}"#,
    )
    .unwrap();
    let mut hw = MockHardware::reading(15.0, 93.74);
    let mut store = warm_store();
    let mut sink = RecordingSink::new();

    let out = run_options(&params, &mut hw, &mut store, &mut sink);

    assert_eq!(hw.calls, vec![pin17(true)]);
    assert!(out.message().starts_with("Temperature within limit"));
}

#[test]
fn out_of_range_options_still_bootstrap_and_control() {
    let params: Params = [("type", "SHT31"), ("heaterpin", "17"), ("limit", "55")]
        .into_iter()
        .collect();
    let mut hw = MockHardware::reading(20.0, 37.37);
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    let first = run_options(&params, &mut hw, &mut store, &mut sink);
    let second = run_options(&params, &mut hw, &mut store, &mut sink);

    assert!(!first.is_error());
    assert_eq!(hw.calls, vec![pin17(false), pin17(true)]);
    assert_eq!(hw.reads, vec![SensorKind::Sht31]);
    assert_eq!(
        second.message(),
        "Temperature within limit temperature 20.0, limit 55, dewPoint 5.0"
    );
}
