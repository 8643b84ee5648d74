//! Mock adapters for integration tests.
//!
//! Records every actuator call and monitor event so tests can assert on
//! the full history without touching GPIO or flash.

use std::cell::Cell;

use speedwatch::app::events::{Diagnostic, MonitorEvent};
use speedwatch::app::ports::{ActuatorPort, Clock, CounterStore, DISPLAY_MAX, EventSink, StorageError};
use speedwatch::nmea::checksum;
use speedwatch::shared::{FrameCounters, GpsSnapshot};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    BuzzerOn,
    BuzzerOff,
    Led(bool),
    Display(u32),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buzzer_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::BuzzerOn => Some(true),
                ActuatorCall::BuzzerOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn display(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Display(v) => Some(*v),
            _ => None,
        })
    }

    pub fn buzzer_ons(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == ActuatorCall::BuzzerOn)
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl ActuatorPort for MockHardware {
    fn buzzer_on(&mut self) {
        self.calls.push(ActuatorCall::BuzzerOn);
    }

    fn buzzer_off(&mut self) {
        self.calls.push(ActuatorCall::BuzzerOff);
    }

    fn set_led(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Led(on));
    }

    fn set_display_value(&mut self, value: u32) {
        self.calls
            .push(ActuatorCall::Display(value.min(u32::from(DISPLAY_MAX))));
    }
}

// ── MockStore ─────────────────────────────────────────────────

/// Single-slot counter store with an injectable write failure.
#[derive(Default)]
pub struct MockStore {
    pub value: Option<u32>,
    pub fail_writes: bool,
    pub writes: Vec<u32>,
    pub get_fails: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn holding(value: u32) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }
}

impl CounterStore for MockStore {
    fn get(&self) -> Result<Option<u32>, StorageError> {
        if self.get_fails {
            return Err(StorageError::IoError);
        }
        Ok(self.value)
    }

    fn set(&mut self, value: u32) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.value = Some(value);
        self.writes.push(value);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<MonitorEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crossings(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MonitorEvent::Crossing { .. }))
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::Diagnostic(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &MonitorEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &MonitorEvent) {
        self.events.push(event.clone());
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Clock the test advances by hand.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: u64) -> u64 {
        self.now.set(self.now.get() + ms);
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// Snapshot of a receiver with a valid fix moving at `speed_kmh`.
#[allow(dead_code)]
pub fn moving(speed_kmh: f32) -> GpsSnapshot {
    let mut snap = GpsSnapshot {
        frames: FrameCounters {
            sentences: 20,
            position_sentences: 10,
            checksum_failures: 0,
        },
        ..Default::default()
    };
    snap.fix.valid = true;
    snap.fix.speed_kmh = speed_kmh;
    snap
}

/// `$<body>*HH\r\n` with a correct checksum.
#[allow(dead_code)]
pub fn sentence(body: &str) -> String {
    let mut out = String::new();
    checksum::write_framed(body, &mut out).unwrap();
    out
}

/// RMC body with a valid fix at `knots`.
#[allow(dead_code)]
pub fn rmc_body(knots: f32) -> String {
    format!("GPRMC,123519,A,4807.038,N,01131.000,E,{knots:.1},084.4,230394,003.1,W")
}
