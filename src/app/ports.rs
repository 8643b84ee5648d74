//! Port traits: the hexagonal boundary between the monitor and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SpeedMonitor (domain)
//! ```
//!
//! Driven adapters (actuators, counter storage, serial transport, event
//! sinks, clock) implement these traits.  The
//! [`SpeedMonitor`](super::service::SpeedMonitor) and the GPS receiver
//! consume them via generics, so the domain core never touches hardware
//! directly.
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - All port errors are typed; callers handle every variant explicitly.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Largest value the three-digit display can show.
pub const DISPLAY_MAX: u16 = 999;

/// Write-side port: fire-and-forget, no feedback read.
pub trait ActuatorPort {
    fn buzzer_on(&mut self);

    fn buzzer_off(&mut self);

    fn set_led(&mut self, on: bool);

    /// Show `value` on the display, clamped to `0..=999`.
    fn set_display_value(&mut self, value: u32);
}

// ───────────────────────────────────────────────────────────────
// Counter store (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Single durable slot holding the crossing counter.
pub trait CounterStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn get(&self) -> Result<Option<u32>, StorageError>;

    /// Persist `value` atomically.
    fn set(&mut self, value: u32) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: receiver ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte transport to the GPS receiver.
pub trait SerialPort {
    /// Read up to `buf.len()` bytes, waiting at most `timeout_ms`.
    /// A timeout is `Ok(0)`, never an error.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, SerialError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// Discard any received bytes not yet read.
    fn flush(&mut self) -> Result<(), SerialError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MonitorEvent`](super::events::MonitorEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::MonitorEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`CounterStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`SerialPort`] operations.  Timeouts are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    ReadFailed,
    WriteFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "UART read failed"),
            Self::WriteFailed => write!(f, "UART write failed"),
        }
    }
}
