//! State shared between the decoder, monitor and display workers.
//!
//! Created once in `main` and handed to each worker behind an `Arc`.
//!
//! | Field          | Writer           | Readers            |
//! |----------------|------------------|--------------------|
//! | fix / quality  | decoder worker   | monitor            |
//! | frame counters | decoder worker   | monitor            |
//! | display value  | monitor (via hw) | display worker     |
//! | command queue  | UI / console     | monitor (drains)   |
//!
//! Records are replaced whole under a critical-section mutex, so a reader
//! never sees a half-written fix.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU16, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::commands::MonitorCommand;
use crate::app::ports::DISPLAY_MAX;
use crate::nmea::{FixRecord, QualityRecord};

/// Pending monitor commands before `send_command` starts refusing.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Decoder frame counters published alongside the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounters {
    /// Checksum-valid sentences of any type, unknown tags included.
    pub sentences: u32,
    /// Of which position/velocity (RMC).
    pub position_sentences: u32,
    pub checksum_failures: u32,
}

/// Everything the monitor needs for one tick, read in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsSnapshot {
    pub fix: FixRecord,
    pub quality: QualityRecord,
    pub frames: FrameCounters,
}

pub struct SharedState {
    fix: Mutex<CriticalSectionRawMutex, RefCell<FixRecord>>,
    quality: Mutex<CriticalSectionRawMutex, Cell<QualityRecord>>,
    frames: Mutex<CriticalSectionRawMutex, Cell<FrameCounters>>,
    display: AtomicU16,
    commands: Channel<CriticalSectionRawMutex, MonitorCommand, COMMAND_QUEUE_DEPTH>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            fix: Mutex::new(RefCell::new(FixRecord::default())),
            quality: Mutex::new(Cell::new(QualityRecord::default())),
            frames: Mutex::new(Cell::new(FrameCounters::default())),
            display: AtomicU16::new(0),
            commands: Channel::new(),
        }
    }

    // ── Records (decoder writes, monitor reads) ──────────────

    pub fn publish_fix(&self, fix: &FixRecord) {
        self.fix.lock(|f| *f.borrow_mut() = fix.clone());
    }

    pub fn publish_quality(&self, quality: QualityRecord) {
        self.quality.lock(|q| q.set(quality));
    }

    pub fn publish_frames(&self, frames: FrameCounters) {
        self.frames.lock(|c| c.set(frames));
    }

    pub fn fix(&self) -> FixRecord {
        self.fix.lock(|f| f.borrow().clone())
    }

    pub fn quality(&self) -> QualityRecord {
        self.quality.lock(|q| q.get())
    }

    pub fn frames(&self) -> FrameCounters {
        self.frames.lock(|c| c.get())
    }

    pub fn snapshot(&self) -> GpsSnapshot {
        GpsSnapshot {
            fix: self.fix(),
            quality: self.quality(),
            frames: self.frames(),
        }
    }

    // ── Display value (monitor writes, display worker reads) ─

    /// Store the value to show, clamped to `0..=999`.
    pub fn set_display_value(&self, value: u32) {
        let clamped = value.min(u32::from(DISPLAY_MAX)) as u16;
        self.display.store(clamped, Ordering::Relaxed);
    }

    pub fn display_value(&self) -> u16 {
        self.display.load(Ordering::Relaxed)
    }

    // ── Command queue ─────────────────────────────────────────

    /// Queue a command for the monitor.  Hands it back when the queue is full.
    pub fn send_command(&self, cmd: MonitorCommand) -> Result<(), MonitorCommand> {
        self.commands.try_send(cmd).map_err(|e| match e {
            embassy_sync::channel::TrySendError::Full(c) => c,
        })
    }

    /// Next pending command, if any.
    pub fn next_command(&self) -> Option<MonitorCommand> {
        self.commands.try_receive().ok()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
