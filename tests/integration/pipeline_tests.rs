//! End-to-end: scripted serial bytes → decoder → shared snapshot → monitor.

use std::sync::Arc;

use speedwatch::adapters::hardware::HardwareAdapter;
use speedwatch::adapters::nvs::NvsAdapter;
use speedwatch::adapters::uart::SimSerial;
use speedwatch::app::commands::MonitorCommand;
use speedwatch::app::events::Diagnostic;
use speedwatch::app::ports::CounterStore;
use speedwatch::app::service::{MonitorStatus, SpeedMonitor};
use speedwatch::config::SystemConfig;
use speedwatch::drivers::buzzer::Buzzer;
use speedwatch::drivers::display_7seg::SevenSegDisplay;
use speedwatch::drivers::status_led::StatusLed;
use speedwatch::gps::GpsReceiver;
use speedwatch::shared::SharedState;

use crate::mock_hw::{MockHardware, MockStore, RecordingSink, rmc_body, sentence};

const GGA: &str = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
const RMC_VOID: &str = "GPRMC,123519,V,,,,,,,230394,,";

fn receiver(config: &SystemConfig) -> GpsReceiver<SimSerial> {
    GpsReceiver::new(SimSerial::new(), config)
}

#[test]
fn rmc_and_gga_reach_the_snapshot() {
    let config = SystemConfig::default();
    let shared = SharedState::new();
    let mut gps = receiver(&config);

    let chunk = format!("{}{}", sentence(&rmc_body(20.0)), sentence(GGA));
    gps.port_mut().push_chunk(chunk.into_bytes());
    assert_eq!(gps.poll(&shared), Ok(2));

    let snap = shared.snapshot();
    assert!(snap.fix.valid);
    assert!((snap.fix.speed_kmh - 37.04).abs() < 0.01);
    assert!((snap.fix.latitude - 48.1173).abs() < 1e-4);
    assert!((snap.fix.longitude - 11.516_667).abs() < 1e-4);
    assert_eq!(snap.fix.time.as_str(), "123519");
    assert_eq!(snap.fix.date.as_str(), "230394");
    assert_eq!(snap.quality.satellites, 8);
    assert!((snap.quality.hdop - 0.9).abs() < 1e-6);
    assert!((snap.quality.altitude_m - 545.4).abs() < 1e-3);
    assert_eq!(snap.frames.sentences, 2);
    assert_eq!(snap.frames.position_sentences, 1);
}

#[test]
fn corrupted_sentence_is_counted_not_published() {
    let shared = SharedState::new();
    let mut gps = receiver(&SystemConfig::default());

    let mut bad = sentence(&rmc_body(20.0));
    // flip a payload digit, keep the old checksum
    bad = bad.replacen("4807.038", "4807.039", 1);
    gps.port_mut().push_chunk(bad.into_bytes());
    assert_eq!(gps.poll(&shared), Ok(0));

    let snap = shared.snapshot();
    assert!(!snap.fix.valid);
    assert_eq!(snap.frames.sentences, 0);
    assert_eq!(snap.frames.checksum_failures, 1);
}

#[test]
fn monitor_follows_the_receiver() {
    let config = SystemConfig::default();
    let shared = SharedState::new();
    let mut gps = receiver(&config);
    let mut monitor = SpeedMonitor::new(&config);
    let (mut hw, mut store, mut sink) = (MockHardware::new(), MockStore::default(), RecordingSink::new());
    monitor.start(&mut hw, &store, &mut sink);

    // nothing on the wire yet
    let s = monitor.run_cycle(&shared, 0, &mut hw, &mut store, &mut sink);
    assert_eq!(s, MonitorStatus::Diagnostic(Diagnostic::NoSignal));

    // GGA only: sentences but no position sentence
    gps.port_mut().push_chunk(sentence(GGA).into_bytes());
    gps.poll(&shared).unwrap();
    let s = monitor.run_cycle(&shared, 40, &mut hw, &mut store, &mut sink);
    assert_eq!(s, MonitorStatus::Diagnostic(Diagnostic::NoPositionSentence));

    // RMC without a fix
    gps.port_mut().push_chunk(sentence(RMC_VOID).into_bytes());
    gps.poll(&shared).unwrap();
    let s = monitor.run_cycle(&shared, 80, &mut hw, &mut store, &mut sink);
    assert_eq!(s, MonitorStatus::Diagnostic(Diagnostic::NoFix));

    // knots: 5.4 → 10 km/h, 18.9 → 35 km/h, 21.6 → 40 km/h, 10.8 → 20 km/h
    let mut now = 120;
    for knots in [5.4, 18.9, 21.6, 10.8, 18.9] {
        gps.port_mut().push_chunk(sentence(&rmc_body(knots)).into_bytes());
        gps.poll(&shared).unwrap();
        monitor.run_cycle(&shared, now, &mut hw, &mut store, &mut sink);
        now += 40;
    }
    assert_eq!(monitor.counter(), 2);
    assert_eq!(store.value, Some(2));
}

#[test]
fn filtered_speed_smooths_a_single_spike() {
    let config = SystemConfig {
        filter_enabled: true,
        filter_hdop_scaling: false,
        filter_measurement_noise: 4.0,
        ..Default::default()
    };
    let shared = SharedState::new();
    let mut gps = receiver(&config);
    let mut monitor = SpeedMonitor::new(&config);
    let (mut hw, mut store, mut sink) = (MockHardware::new(), MockStore::default(), RecordingSink::new());

    // settle on ~20 km/h, then one 60 km/h outlier
    let mut now = 0;
    for knots in [10.8; 30].into_iter().chain([32.4]) {
        gps.port_mut().push_chunk(sentence(&rmc_body(knots)).into_bytes());
        gps.poll(&shared).unwrap();
        monitor.run_cycle(&shared, now, &mut hw, &mut store, &mut sink);
        now += 40;
    }
    assert!(shared.fix().speed_kmh < 30.0);
    assert_eq!(monitor.counter(), 0);
    assert!(gps.filter().is_some());
}

#[test]
fn nvs_backed_counter_survives_a_restart() {
    let config = SystemConfig::default();
    let shared = Arc::new(SharedState::new());
    let mut nvs = NvsAdapter::new().unwrap();
    let mut hw = HardwareAdapter::new(Buzzer::new(), StatusLed::new(), Arc::clone(&shared));
    let mut sink = RecordingSink::new();

    let mut first = SpeedMonitor::new(&config);
    first.start(&mut hw, &nvs, &mut sink);
    for (i, speed) in [50.0, 10.0, 50.0].into_iter().enumerate() {
        first.tick(&crate::mock_hw::moving(speed), i as u64 * 40, &mut hw, &mut nvs, &mut sink);
    }
    assert_eq!(nvs.get(), Ok(Some(2)));
    assert_eq!(shared.display_value(), 2);

    let mut second = SpeedMonitor::new(&config);
    second.start(&mut hw, &nvs, &mut sink);
    assert_eq!(second.counter(), 2);
}

#[test]
fn reset_command_reaches_display_worker() {
    let config = SystemConfig::default();
    let shared = Arc::new(SharedState::new());
    let mut hw = HardwareAdapter::new(Buzzer::new(), StatusLed::new(), Arc::clone(&shared));
    let mut store = MockStore::holding(123);
    let mut sink = RecordingSink::new();
    let mut monitor = SpeedMonitor::new(&config);
    monitor.start(&mut hw, &store, &mut sink);

    let mut display = SevenSegDisplay::new();
    let digits: Vec<u8> = (0..3).map(|_| display.step(shared.display_value()).bcd).collect();
    assert_eq!(digits, vec![1, 2, 3]);

    shared.send_command(MonitorCommand::ResetCounter).unwrap();
    monitor.run_cycle(&shared, 0, &mut hw, &mut store, &mut sink);
    assert!(hw.buzzer().is_on());

    let digits: Vec<u8> = (0..3).map(|_| display.step(shared.display_value()).bcd).collect();
    assert_eq!(digits, vec![0, 0, 0]);
    assert_eq!(store.value, Some(0));
}
