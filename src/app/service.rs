//! Threshold monitor: the hexagonal core.
//!
//! [`SpeedMonitor`] owns the crossing counter, the armed flag and the
//! alert generator.  All I/O flows through port traits injected at call
//! sites, making it testable with mock adapters.
//!
//! ```text
//!  GpsSnapshot ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │       SpeedMonitor        │
//! ActuatorPort ◀── │ gating · edges · alerts   │ ──▶ CounterStore
//!                  └──────────────────────────┘
//! ```
//!
//! Evaluation order per tick: no-signal, no-position-sentence, no-fix,
//! then the edge detector.  Diagnostic outcomes leave the counter and
//! the armed flag untouched.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::drivers::alert_pattern::{AlertPattern, BuzzerChange};
use crate::shared::{GpsSnapshot, SharedState};

use super::commands::MonitorCommand;
use super::events::{Diagnostic, MonitorEvent};
use super::ports::{ActuatorPort, CounterStore, EventSink};

/// Outcome of one monitor tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Threshold logic skipped.
    Diagnostic(Diagnostic),
    Below,
    RisingEdge,
    Sustained,
    FallingEdge,
}

impl MonitorStatus {
    /// How long the monitor worker should wait before the next tick.
    pub fn wait_ms(self, config: &SystemConfig) -> u32 {
        match self {
            Self::Diagnostic(Diagnostic::NoSignal | Diagnostic::NoPositionSentence) => {
                config.no_signal_backoff_ms
            }
            Self::Diagnostic(Diagnostic::NoFix) => config.no_fix_backoff_ms,
            _ => config.monitor_period_ms,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SpeedMonitor
// ───────────────────────────────────────────────────────────────

pub struct SpeedMonitor {
    threshold_kmh: f32,
    movement_floor_kmh: f32,
    counter: u32,
    /// True while continuously above the threshold.
    armed: bool,
    last_fix_valid: bool,
    /// Outcome of the previous tick's gating, if it skipped.
    diagnostic: Option<Diagnostic>,
    crossing_pulse_ms: u32,
    reset_pulse_ms: u32,
    alert: AlertPattern,
}

impl SpeedMonitor {
    /// Construct from configuration.  Call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            threshold_kmh: config.speed_threshold_kmh,
            movement_floor_kmh: config.movement_floor_kmh,
            counter: 0,
            armed: false,
            last_fix_valid: false,
            diagnostic: None,
            crossing_pulse_ms: config.alert.crossing_pulse_ms,
            reset_pulse_ms: config.alert.reset_pulse_ms,
            alert: AlertPattern::new(config.alert),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the persisted counter (absent or unreadable → 0) and show it.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        store: &impl CounterStore,
        sink: &mut impl EventSink,
    ) {
        self.counter = match store.get() {
            Ok(Some(v)) => v,
            Ok(None) => 0,
            Err(e) => {
                warn!("Counter load failed ({}), starting from 0", e);
                0
            }
        };
        hw.set_display_value(self.counter);
        sink.emit(&MonitorEvent::Started { counter: self.counter });
        info!(
            "Monitor started: counter={} threshold={:.1} km/h",
            self.counter, self.threshold_kmh
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Drain pending commands, then run one tick on the latest snapshot.
    pub fn run_cycle(
        &mut self,
        shared: &SharedState,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        store: &mut impl CounterStore,
        sink: &mut impl EventSink,
    ) -> MonitorStatus {
        while let Some(cmd) = shared.next_command() {
            self.handle_command(cmd, now_ms, hw, store, sink);
        }
        self.tick(&shared.snapshot(), now_ms, hw, store, sink)
    }

    /// Evaluate one snapshot and apply its side effects.
    pub fn tick(
        &mut self,
        snap: &GpsSnapshot,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        store: &mut impl CounterStore,
        sink: &mut impl EventSink,
    ) -> MonitorStatus {
        let status = self.evaluate(snap, now_ms, hw, store, sink);

        // Pending beeps and pulses end on time in every state.
        let sustained = status == MonitorStatus::Sustained;
        if let Some(change) = self.alert.step(now_ms, sustained) {
            apply_buzzer(hw, change);
        }
        status
    }

    fn evaluate(
        &mut self,
        snap: &GpsSnapshot,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        store: &mut impl CounterStore,
        sink: &mut impl EventSink,
    ) -> MonitorStatus {
        // 1–3. Diagnostic gating
        let gate = if snap.frames.sentences == 0 {
            Some(Diagnostic::NoSignal)
        } else if snap.frames.position_sentences == 0 {
            Some(Diagnostic::NoPositionSentence)
        } else if !snap.fix.valid {
            Some(Diagnostic::NoFix)
        } else {
            None
        };
        self.last_fix_valid = snap.frames.position_sentences > 0 && snap.fix.valid;
        if let Some(diag) = gate {
            self.diagnostic = Some(diag);
            sink.emit(&MonitorEvent::Diagnostic(diag));
            return MonitorStatus::Diagnostic(diag);
        }
        if self.diagnostic.take().is_some() {
            sink.emit(&MonitorEvent::FixAcquired);
        }

        // Near-zero readings are GPS jitter while stationary.
        let speed = if snap.fix.speed_kmh < self.movement_floor_kmh {
            0.0
        } else {
            snap.fix.speed_kmh
        };
        let above = speed > self.threshold_kmh;

        // 4–7. Edge detector
        match (self.armed, above) {
            (false, false) => MonitorStatus::Below,
            (false, true) => {
                self.counter = self.counter.saturating_add(1);
                self.persist(store, sink);
                hw.set_display_value(self.counter);
                apply_buzzer(hw, self.alert.pulse(now_ms, self.crossing_pulse_ms));
                self.armed = true;
                sink.emit(&MonitorEvent::Crossing {
                    counter: self.counter,
                    speed_kmh: speed,
                });
                MonitorStatus::RisingEdge
            }
            (true, true) => MonitorStatus::Sustained,
            (true, false) => {
                self.armed = false;
                self.alert.restart_group();
                sink.emit(&MonitorEvent::BelowThreshold { speed_kmh: speed });
                MonitorStatus::FallingEdge
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: MonitorCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        store: &mut impl CounterStore,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            MonitorCommand::ResetCounter => {
                self.counter = 0;
                self.persist(store, sink);
                self.armed = false;
                self.alert.restart_group();
                hw.set_display_value(0);
                apply_buzzer(hw, self.alert.pulse(now_ms, self.reset_pulse_ms));
                sink.emit(&MonitorEvent::CounterReset);
            }
            MonitorCommand::SetThreshold(kmh) => {
                if !is_speed(kmh) {
                    sink.emit(&MonitorEvent::CommandRejected(
                        "threshold must be finite and non-negative",
                    ));
                } else if kmh < self.movement_floor_kmh {
                    sink.emit(&MonitorEvent::CommandRejected(
                        "threshold must be >= movement floor",
                    ));
                } else {
                    self.threshold_kmh = kmh;
                    sink.emit(&MonitorEvent::ThresholdChanged { threshold_kmh: kmh });
                }
            }
            MonitorCommand::SetMovementFloor(kmh) => {
                if !is_speed(kmh) {
                    sink.emit(&MonitorEvent::CommandRejected(
                        "movement floor must be finite and non-negative",
                    ));
                } else if kmh > self.threshold_kmh {
                    sink.emit(&MonitorEvent::CommandRejected(
                        "movement floor must be <= threshold",
                    ));
                } else {
                    self.movement_floor_kmh = kmh;
                    sink.emit(&MonitorEvent::MovementFloorChanged { floor_kmh: kmh });
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn threshold_kmh(&self) -> f32 {
        self.threshold_kmh
    }

    pub fn movement_floor_kmh(&self) -> f32 {
        self.movement_floor_kmh
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn last_fix_valid(&self) -> bool {
        self.last_fix_valid
    }

    pub fn alert(&self) -> &AlertPattern {
        &self.alert
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write-through; a failure leaves the in-memory counter authoritative.
    fn persist(&self, store: &mut impl CounterStore, sink: &mut impl EventSink) {
        if let Err(error) = store.set(self.counter) {
            sink.emit(&MonitorEvent::PersistFailed {
                counter: self.counter,
                error,
            });
        }
    }
}

fn is_speed(kmh: f32) -> bool {
    kmh.is_finite() && kmh >= 0.0
}

fn apply_buzzer(hw: &mut impl ActuatorPort, change: BuzzerChange) {
    match change {
        BuzzerChange::On => hw.buzzer_on(),
        BuzzerChange::Off => hw.buzzer_off(),
    }
}
