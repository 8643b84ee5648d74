//! Unified error types for the speedwatch firmware.
//!
//! A single `Error` enum that every subsystem converts into, so bring-up
//! in `main` handles failures uniformly.  All variants are `Copy`.
//!
//! The running workers never surface these: decode problems, diagnostic
//! states and persistence failures are absorbed where they happen.

use core::fmt;

use crate::app::ports::{ConfigError, SerialError, StorageError};
use crate::drivers::hw_init::HwInitError;
use crate::gps::commands::GpsConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// GPIO bring-up failed.
    Init(HwInitError),
    /// Serial transport to the receiver failed.
    Serial(SerialError),
    /// The receiver rejected or never got a configuration command.
    GpsConfig(GpsConfigError),
    /// Counter storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Serial(e) => write!(f, "serial: {e}"),
            Self::GpsConfig(e) => write!(f, "gps config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

impl From<GpsConfigError> for Error {
    fn from(e: GpsConfigError) -> Self {
        Self::GpsConfig(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
