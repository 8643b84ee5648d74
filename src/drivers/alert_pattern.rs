//! Buzzer alert pattern generator.
//!
//! Produces the "bi-bi ... bi-bi" cadence while speed stays above the
//! threshold, and single confirmation pulses for crossings and resets.
//! The monitor calls [`AlertPattern::step`] every tick with the current
//! monotonic time; the generator answers with the buzzer level change, if
//! any.  It never sleeps: a beep is switched on with a deadline and a
//! later step switches it off.
//!
//! ```text
//!  on  ┌──┐      ┌──┐
//!      │70│ 180  │70│          600               180  ┌──┐
//!  off ┘  └──────┘  └──────────────────────────────────┘  └─ ...
//! ```
//!
//! Pulses and the cadence share the same deadline, so they never overlap.

use serde::{Deserialize, Serialize};

/// Beep cadence and pulse durations (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTiming {
    pub beep_ms: u32,
    pub beep_gap_ms: u32,
    pub group_pause_ms: u32,
    pub crossing_pulse_ms: u32,
    pub reset_pulse_ms: u32,
}

impl Default for AlertTiming {
    fn default() -> Self {
        Self {
            beep_ms: 70,
            beep_gap_ms: 180,
            group_pause_ms: 600,
            crossing_pulse_ms: 120,
            reset_pulse_ms: 100,
        }
    }
}

/// Beeps per group.
pub const BEEPS_PER_GROUP: u8 = 2;

/// Buzzer level change requested by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerChange {
    On,
    Off,
}

/// Timestamp-driven alert generator. Stack-allocated, no heap.
#[derive(Debug, Clone)]
pub struct AlertPattern {
    timing: AlertTiming,
    /// When the last beep (or pulse) ended, or the group last restarted.
    last_beep_ms: u64,
    beeps_in_group: u8,
    /// Deadline of the beep or pulse currently sounding.
    on_until_ms: Option<u64>,
}

impl AlertPattern {
    pub fn new(timing: AlertTiming) -> Self {
        Self {
            timing,
            last_beep_ms: 0,
            beeps_in_group: 0,
            on_until_ms: None,
        }
    }

    /// Sound a single pulse of `duration_ms`, cutting short any beep in
    /// progress.  Returns the level change to apply now.
    pub fn pulse(&mut self, now_ms: u64, duration_ms: u32) -> BuzzerChange {
        self.on_until_ms = Some(now_ms + u64::from(duration_ms));
        BuzzerChange::On
    }

    /// Advance the generator.
    ///
    /// `sustained` is true while the monitor is armed above the threshold;
    /// when false only pending beeps and pulses are finished.
    pub fn step(&mut self, now_ms: u64, sustained: bool) -> Option<BuzzerChange> {
        if let Some(deadline) = self.on_until_ms {
            if now_ms < deadline {
                return None;
            }
            self.on_until_ms = None;
            self.last_beep_ms = now_ms;
            return Some(BuzzerChange::Off);
        }

        if !sustained {
            return None;
        }

        let since_last = now_ms.saturating_sub(self.last_beep_ms);
        if self.beeps_in_group < BEEPS_PER_GROUP {
            if since_last > u64::from(self.timing.beep_gap_ms) {
                self.beeps_in_group += 1;
                self.on_until_ms = Some(now_ms + u64::from(self.timing.beep_ms));
                return Some(BuzzerChange::On);
            }
        } else if since_last > u64::from(self.timing.group_pause_ms) {
            self.beeps_in_group = 0;
            self.last_beep_ms = now_ms;
        }
        None
    }

    /// Start the next sustained episode with a fresh group.
    pub fn restart_group(&mut self) {
        self.beeps_in_group = 0;
    }

    /// Whether a beep or pulse is currently sounding.
    pub fn is_sounding(&self) -> bool {
        self.on_until_ms.is_some()
    }

    pub fn beeps_in_group(&self) -> u8 {
        self.beeps_in_group
    }

    pub fn timing(&self) -> &AlertTiming {
        &self.timing
    }
}
