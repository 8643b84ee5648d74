//! Integration tests for the threshold monitor against mock adapters.

use speedwatch::app::commands::MonitorCommand;
use speedwatch::app::events::{Diagnostic, MonitorEvent};
use speedwatch::app::ports::{Clock, StorageError};
use speedwatch::app::service::{MonitorStatus, SpeedMonitor};
use speedwatch::config::SystemConfig;
use speedwatch::nmea::QualityRecord;
use speedwatch::shared::{GpsSnapshot, SharedState};

use crate::mock_hw::{ActuatorCall, ManualClock, MockHardware, MockStore, RecordingSink, moving};

struct Rig {
    monitor: SpeedMonitor,
    hw: MockHardware,
    store: MockStore,
    sink: RecordingSink,
    clock: ManualClock,
}

impl Rig {
    fn with_store(store: MockStore) -> Self {
        let mut rig = Self {
            monitor: SpeedMonitor::new(&SystemConfig::default()),
            hw: MockHardware::new(),
            store,
            sink: RecordingSink::new(),
            clock: ManualClock::default(),
        };
        rig.monitor.start(&mut rig.hw, &rig.store, &mut rig.sink);
        rig
    }

    fn new() -> Self {
        Self::with_store(MockStore::default())
    }

    /// One 40 ms monitor period on `snap`.
    fn tick(&mut self, snap: &GpsSnapshot) -> MonitorStatus {
        let now = self.clock.advance(40);
        self.monitor
            .tick(snap, now, &mut self.hw, &mut self.store, &mut self.sink)
    }

    fn drive(&mut self, speeds: &[f32]) -> Vec<MonitorStatus> {
        speeds.iter().map(|&s| self.tick(&moving(s))).collect()
    }
}

// ── Edge triggering ───────────────────────────────────────────

#[test]
fn counts_once_per_rising_edge() {
    let mut rig = Rig::new();
    let statuses = rig.drive(&[10.0, 35.0, 40.0, 20.0, 35.0]);

    assert_eq!(
        statuses,
        vec![
            MonitorStatus::Below,
            MonitorStatus::RisingEdge,
            MonitorStatus::Sustained,
            MonitorStatus::FallingEdge,
            MonitorStatus::RisingEdge,
        ]
    );
    assert_eq!(rig.monitor.counter(), 2);
    assert_eq!(rig.sink.crossings(), 2);
    assert_eq!(rig.store.writes, vec![1, 2]);
    assert_eq!(rig.hw.display(), Some(2));
}

#[test]
fn speed_equal_to_threshold_is_not_above() {
    let mut rig = Rig::new();
    rig.drive(&[30.0, 30.0, 30.0]);
    assert_eq!(rig.monitor.counter(), 0);
    assert!(!rig.monitor.is_armed());
}

#[test]
fn counter_continues_from_stored_value() {
    let mut rig = Rig::with_store(MockStore::holding(41));
    assert_eq!(rig.hw.display(), Some(41));
    assert!(rig.sink.contains(&MonitorEvent::Started { counter: 41 }));

    rig.drive(&[50.0]);
    assert_eq!(rig.monitor.counter(), 42);
    assert_eq!(rig.store.value, Some(42));
}

#[test]
fn unreadable_store_starts_from_zero() {
    let store = MockStore {
        value: Some(9),
        get_fails: true,
        ..Default::default()
    };
    let rig = Rig::with_store(store);
    assert_eq!(rig.monitor.counter(), 0);
    assert_eq!(rig.hw.display(), Some(0));
}

#[test]
fn display_saturates_at_three_digits() {
    let mut rig = Rig::with_store(MockStore::holding(999));
    rig.drive(&[50.0]);
    assert_eq!(rig.monitor.counter(), 1000);
    assert_eq!(rig.hw.display(), Some(999));
}

// ── Diagnostic gating ─────────────────────────────────────────

#[test]
fn no_sentences_is_no_signal_despite_stale_quality() {
    let mut rig = Rig::new();
    let mut snap = GpsSnapshot {
        quality: QualityRecord {
            altitude_m: 545.4,
            satellites: 8,
            hdop: 0.9,
        },
        ..Default::default()
    };
    snap.fix.speed_kmh = 80.0;

    assert_eq!(rig.tick(&snap), MonitorStatus::Diagnostic(Diagnostic::NoSignal));
    assert_eq!(rig.monitor.counter(), 0);
    assert!(rig.store.writes.is_empty());
}

#[test]
fn sentences_without_rmc_is_no_position_sentence() {
    let mut rig = Rig::new();
    let mut snap = moving(80.0);
    snap.frames.position_sentences = 0;

    assert_eq!(
        rig.tick(&snap),
        MonitorStatus::Diagnostic(Diagnostic::NoPositionSentence)
    );
    assert_eq!(rig.monitor.counter(), 0);
}

#[test]
fn invalid_fix_never_counts_whatever_the_speed() {
    let mut rig = Rig::new();
    let mut snap = moving(120.0);
    snap.fix.valid = false;

    for _ in 0..5 {
        assert_eq!(rig.tick(&snap), MonitorStatus::Diagnostic(Diagnostic::NoFix));
    }
    assert_eq!(rig.monitor.counter(), 0);
    assert!(!rig.monitor.last_fix_valid());
    assert_eq!(rig.sink.diagnostics(), vec![Diagnostic::NoFix; 5]);
}

#[test]
fn diagnostics_leave_armed_flag_alone() {
    let mut rig = Rig::new();
    rig.drive(&[50.0]);
    assert!(rig.monitor.is_armed());

    let mut lost = moving(50.0);
    lost.fix.valid = false;
    rig.tick(&lost);
    assert!(rig.monitor.is_armed());

    // fix comes back still above: no second count
    assert_eq!(rig.tick(&moving(50.0)), MonitorStatus::Sustained);
    assert_eq!(rig.monitor.counter(), 1);
    assert!(rig.sink.contains(&MonitorEvent::FixAcquired));
}

#[test]
fn floor_treats_jitter_as_stationary() {
    let cfg = SystemConfig {
        speed_threshold_kmh: 5.0,
        movement_floor_kmh: 5.0,
        ..Default::default()
    };
    let mut rig = Rig::new();
    rig.monitor = SpeedMonitor::new(&cfg);
    rig.drive(&[3.0, 4.9, 3.5, 5.0]);
    assert_eq!(rig.monitor.counter(), 0);
    rig.drive(&[5.5]);
    assert_eq!(rig.monitor.counter(), 1);
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_zeroes_persists_and_next_edge_gives_one() {
    let mut rig = Rig::with_store(MockStore::holding(7));
    rig.drive(&[50.0]);
    assert_eq!(rig.monitor.counter(), 8);

    let now = rig.clock.advance(40);
    rig.monitor.handle_command(
        MonitorCommand::ResetCounter,
        now,
        &mut rig.hw,
        &mut rig.store,
        &mut rig.sink,
    );
    assert_eq!(rig.monitor.counter(), 0);
    assert_eq!(rig.store.value, Some(0));
    assert_eq!(rig.hw.display(), Some(0));
    assert!(!rig.monitor.is_armed());
    assert!(rig.hw.buzzer_on(), "confirmation pulse");
    assert!(rig.sink.contains(&MonitorEvent::CounterReset));

    // still above the threshold: reset disarmed, so this is a fresh edge
    assert_eq!(rig.tick(&moving(50.0)), MonitorStatus::RisingEdge);
    assert_eq!(rig.monitor.counter(), 1);
    assert_eq!(rig.store.value, Some(1));
}

// ── Persistence failure ───────────────────────────────────────

#[test]
fn failed_write_keeps_in_memory_counter() {
    let mut rig = Rig::with_store(MockStore::holding(3));
    rig.store.fail_writes = true;

    rig.drive(&[50.0, 10.0, 50.0]);
    assert_eq!(rig.monitor.counter(), 5);
    assert_eq!(rig.store.value, Some(3));
    assert_eq!(rig.hw.display(), Some(5));
    assert!(rig.sink.contains(&MonitorEvent::PersistFailed {
        counter: 5,
        error: StorageError::IoError,
    }));
}

// ── Alert cadence ─────────────────────────────────────────────

#[test]
fn sustained_speed_plays_double_beep_then_pauses() {
    let mut rig = Rig::new();
    let mut ons = Vec::new();
    for _ in 0..40 {
        let before = rig.hw.buzzer_ons();
        rig.tick(&moving(60.0));
        if rig.hw.buzzer_ons() > before {
            ons.push(rig.clock.now_ms());
        }
    }
    // crossing pulse, two beeps, then a pause before the next group
    assert_eq!(ons[0], 40);
    assert_eq!(ons.len(), 4);
    let group_gap = ons[3] - ons[2];
    assert!(group_gap > 600, "pause was {group_gap} ms");
    assert!(ons[2] - ons[1] < 400);
    assert_eq!(rig.monitor.counter(), 1);
}

#[test]
fn falling_edge_silences_cadence_but_not_running_beep() {
    let mut rig = Rig::new();
    rig.drive(&[60.0]);
    assert!(rig.hw.buzzer_on());
    rig.drive(&[10.0]);
    // the crossing pulse still runs to its end
    assert!(rig.hw.buzzer_on());
    rig.drive(&[10.0, 10.0]);
    assert!(!rig.hw.buzzer_on());

    rig.hw.clear();
    rig.drive(&[10.0; 30]);
    assert_eq!(rig.hw.buzzer_ons(), 0);
}

// ── Commands through the shared state ─────────────────────────

#[test]
fn commands_are_drained_before_the_tick() {
    let shared = SharedState::new();
    let mut rig = Rig::new();
    let snap = moving(25.0);
    shared.publish_fix(&snap.fix);
    shared.publish_frames(snap.frames);

    shared.send_command(MonitorCommand::SetThreshold(20.0)).unwrap();
    let now = rig.clock.advance(40);
    let status = rig
        .monitor
        .run_cycle(&shared, now, &mut rig.hw, &mut rig.store, &mut rig.sink);

    assert_eq!(status, MonitorStatus::RisingEdge);
    assert_eq!(rig.monitor.threshold_kmh(), 20.0);
    assert!(rig.sink.contains(&MonitorEvent::ThresholdChanged { threshold_kmh: 20.0 }));
    assert_eq!(shared.next_command(), None);
}

#[test]
fn invalid_setter_values_rejected() {
    let mut rig = Rig::new();
    for cmd in [
        MonitorCommand::SetThreshold(f32::NAN),
        MonitorCommand::SetThreshold(-1.0),
        MonitorCommand::SetMovementFloor(f32::INFINITY),
    ] {
        rig.monitor
            .handle_command(cmd, 0, &mut rig.hw, &mut rig.store, &mut rig.sink);
    }
    assert_eq!(rig.monitor.threshold_kmh(), 30.0);
    assert_eq!(rig.monitor.movement_floor_kmh(), 5.0);
    let rejected = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, MonitorEvent::CommandRejected(_)))
        .count();
    assert_eq!(rejected, 3);
}

#[test]
fn movement_floor_setter_applies() {
    let mut rig = Rig::new();
    rig.monitor.handle_command(
        MonitorCommand::SetMovementFloor(8.0),
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut rig.sink,
    );
    assert_eq!(rig.monitor.movement_floor_kmh(), 8.0);
    assert!(
        !rig.hw
            .calls
            .iter()
            .any(|c| matches!(c, ActuatorCall::BuzzerOn))
    );
}

#[test]
fn setters_keep_floor_at_or_below_threshold() {
    let mut rig = Rig::new();
    for cmd in [
        MonitorCommand::SetThreshold(4.0),
        MonitorCommand::SetMovementFloor(31.0),
    ] {
        rig.monitor
            .handle_command(cmd, 0, &mut rig.hw, &mut rig.store, &mut rig.sink);
    }
    assert_eq!(rig.monitor.threshold_kmh(), 30.0);
    assert_eq!(rig.monitor.movement_floor_kmh(), 5.0);
    assert!(rig.sink.contains(&MonitorEvent::CommandRejected(
        "threshold must be >= movement floor"
    )));
    assert!(rig.sink.contains(&MonitorEvent::CommandRejected(
        "movement floor must be <= threshold"
    )));

    // equal is allowed both ways
    rig.monitor.handle_command(
        MonitorCommand::SetMovementFloor(30.0),
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut rig.sink,
    );
    rig.monitor.handle_command(
        MonitorCommand::SetThreshold(30.0),
        0,
        &mut rig.hw,
        &mut rig.store,
        &mut rig.sink,
    );
    assert_eq!(rig.monitor.movement_floor_kmh(), 30.0);
    assert_eq!(rig.monitor.threshold_kmh(), 30.0);

    // a valid pair stays valid after the setters
    let cfg = SystemConfig {
        speed_threshold_kmh: rig.monitor.threshold_kmh(),
        movement_floor_kmh: rig.monitor.movement_floor_kmh(),
        ..Default::default()
    };
    assert!(speedwatch::adapters::nvs::validate_config(&cfg).is_ok());
}
