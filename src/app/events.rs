//! Outbound monitor events.
//!
//! The [`SpeedMonitor`](super::service::SpeedMonitor) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use super::ports::StorageError;

/// Why the threshold logic was skipped this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// No sentence of any kind received yet.
    NoSignal,
    /// Sentences arrive, but no position/velocity sentence among them.
    NoPositionSentence,
    /// Latest position sentence reports no fix.
    NoFix,
}

impl Diagnostic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSignal => "no GPS sentences received",
            Self::NoPositionSentence => "no RMC sentences received",
            Self::NoFix => "GPS has no fix",
        }
    }
}

/// Structured events emitted by the monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// Monitor started with the counter loaded from storage.
    Started { counter: u32 },

    /// Threshold logic skipped for this tick.
    Diagnostic(Diagnostic),

    /// First tick with a valid fix after one or more diagnostic ticks.
    FixAcquired,

    /// Speed rose above the threshold; counter incremented.
    Crossing { counter: u32, speed_kmh: f32 },

    /// Speed fell back to or below the threshold.
    BelowThreshold { speed_kmh: f32 },

    /// Counter explicitly reset to zero.
    CounterReset,

    /// Counter write failed; the in-memory value stays authoritative.
    PersistFailed { counter: u32, error: StorageError },

    ThresholdChanged { threshold_kmh: f32 },

    MovementFloorChanged { floor_kmh: f32 },

    /// A command carried an unusable value and was ignored.
    CommandRejected(&'static str),
}
