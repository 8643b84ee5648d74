//! Receiver configuration commands (MediaTek PMTK sentences).
//!
//! | Command   | Purpose                                   |
//! |-----------|-------------------------------------------|
//! | `PMTK220` | position fix interval                     |
//! | `PMTK300` | fix control interval                      |
//! | `PMTK314` | per-sentence output enable mask           |
//!
//! Every command is framed as `$<body>*HH\r\n`.  A rejected request (rate
//! outside 1-5 Hz) fails before anything is written to the receiver.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::info;
use serde::{Deserialize, Serialize};

use crate::app::ports::{SerialError, SerialPort};
use crate::nmea::checksum::write_framed;

/// Framed command capacity (`$PMTK314,...*HH\r\n` is the longest).
pub const COMMAND_LEN: usize = 64;

/// One framed command ready for the wire.
pub type Command = String<COMMAND_LEN>;

/// Settle time between consecutive configuration steps.
pub const STEP_SETTLE_MS: u32 = 200;

/// Settle time after a factory-default restore.
pub const RESTORE_SETTLE_MS: u32 = 1200;

const MASK_RMC_GGA: &str = "PMTK314,0,1,0,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0";
const MASK_RMC_ONLY: &str = "PMTK314,0,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0";
const MASK_GGA_ONLY: &str = "PMTK314,0,0,0,0,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0";
const MASK_ALL: &str = "PMTK314,-1";

// ── Errors ────────────────────────────────────────────────────

/// Errors from receiver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsConfigError {
    /// Requested update rate is outside 1-5 Hz.
    InvalidRate(u8),
    /// Command text does not fit the frame buffer.
    CommandTooLong,
    /// The serial transport failed while sending.
    Serial(SerialError),
}

impl fmt::Display for GpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRate(hz) => write!(f, "invalid update rate {} Hz (use 1-5)", hz),
            Self::CommandTooLong => write!(f, "command exceeds {} bytes", COMMAND_LEN),
            Self::Serial(e) => write!(f, "serial: {}", e),
        }
    }
}

impl From<SerialError> for GpsConfigError {
    fn from(e: SerialError) -> Self {
        Self::Serial(e)
    }
}

// ── Selectors ─────────────────────────────────────────────────

/// Supported position fix rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRate {
    Hz1,
    Hz2,
    Hz3,
    Hz4,
    Hz5,
}

impl UpdateRate {
    /// Fix interval in milliseconds as the receiver expects it.
    pub const fn interval_ms(self) -> u16 {
        match self {
            Self::Hz1 => 1000,
            Self::Hz2 => 500,
            Self::Hz3 => 333,
            Self::Hz4 => 250,
            Self::Hz5 => 200,
        }
    }

    pub const fn hz(self) -> u8 {
        match self {
            Self::Hz1 => 1,
            Self::Hz2 => 2,
            Self::Hz3 => 3,
            Self::Hz4 => 4,
            Self::Hz5 => 5,
        }
    }
}

impl TryFrom<u8> for UpdateRate {
    type Error = GpsConfigError;

    fn try_from(hz: u8) -> Result<Self, Self::Error> {
        match hz {
            1 => Ok(Self::Hz1),
            2 => Ok(Self::Hz2),
            3 => Ok(Self::Hz3),
            4 => Ok(Self::Hz4),
            5 => Ok(Self::Hz5),
            other => Err(GpsConfigError::InvalidRate(other)),
        }
    }
}

/// Which sentences the receiver emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentenceFilter {
    /// RMC + GGA only (what the monitor consumes).
    RmcAndGga,
    RmcOnly,
    GgaOnly,
    /// Factory defaults: 1 Hz, every sentence type.
    FactoryDefault,
}

// ── Command construction ──────────────────────────────────────

/// Frame a PMTK body as `$<body>*HH\r\n`.
pub fn frame(body: &str) -> Result<Command, GpsConfigError> {
    let mut cmd = Command::new();
    write_framed(body, &mut cmd).map_err(|_| GpsConfigError::CommandTooLong)?;
    Ok(cmd)
}

/// `PMTK300` + `PMTK220` pair for `rate`.
pub fn rate_commands(rate: UpdateRate) -> Result<[Command; 2], GpsConfigError> {
    let ms = rate.interval_ms();
    let mut fix_ctl: String<32> = String::new();
    let mut interval: String<32> = String::new();
    write!(fix_ctl, "PMTK300,{},0,0,0,0", ms).map_err(|_| GpsConfigError::CommandTooLong)?;
    write!(interval, "PMTK220,{}", ms).map_err(|_| GpsConfigError::CommandTooLong)?;
    Ok([frame(&fix_ctl)?, frame(&interval)?])
}

/// `PMTK314` output mask for `filter`.
pub fn filter_command(filter: SentenceFilter) -> Result<Command, GpsConfigError> {
    frame(match filter {
        SentenceFilter::RmcAndGga => MASK_RMC_GGA,
        SentenceFilter::RmcOnly => MASK_RMC_ONLY,
        SentenceFilter::GgaOnly => MASK_GGA_ONLY,
        SentenceFilter::FactoryDefault => MASK_ALL,
    })
}

// ── Sending ───────────────────────────────────────────────────

fn send(port: &mut impl SerialPort, cmd: &Command) -> Result<(), GpsConfigError> {
    port.write(cmd.as_bytes())?;
    info!("GPS cmd sent: {}", cmd.trim_end());
    Ok(())
}

/// Set the fix rate.  Out-of-range rates are rejected before any write.
pub fn set_update_rate(port: &mut impl SerialPort, hz: u8) -> Result<UpdateRate, GpsConfigError> {
    let rate = UpdateRate::try_from(hz)?;
    let cmds = rate_commands(rate)?;
    for cmd in &cmds {
        send(port, cmd)?;
    }
    info!("GPS update rate set to {} Hz", rate.hz());
    Ok(rate)
}

/// Select which sentences the receiver emits.
///
/// The RMC+GGA mask is sent twice, as the receiver occasionally drops the
/// first one right after a rate change.
pub fn set_sentence_filter(
    port: &mut impl SerialPort,
    delay: &mut impl DelayNs,
    filter: SentenceFilter,
) -> Result<(), GpsConfigError> {
    if filter == SentenceFilter::FactoryDefault {
        return restore_default(port, delay);
    }
    let cmd = filter_command(filter)?;
    send(port, &cmd)?;
    if filter == SentenceFilter::RmcAndGga {
        delay.delay_ms(STEP_SETTLE_MS);
        send(port, &cmd)?;
    }
    info!("GPS sentence output: {:?}", filter);
    Ok(())
}

/// Restore 1 Hz with every sentence enabled, then discard stale input.
pub fn restore_default(port: &mut impl SerialPort, delay: &mut impl DelayNs) -> Result<(), GpsConfigError> {
    for cmd in rate_commands(UpdateRate::Hz1)? {
        send(port, &cmd)?;
    }
    send(port, &filter_command(SentenceFilter::FactoryDefault)?)?;
    port.flush()?;
    delay.delay_ms(RESTORE_SETTLE_MS);
    info!("GPS restored to factory default (1 Hz, all sentences)");
    Ok(())
}

/// Boot-time configuration: rate, sentence mask, then flush.
///
/// The rate is validated first, so an invalid request sends nothing.
pub fn configure(
    port: &mut impl SerialPort,
    delay: &mut impl DelayNs,
    rate_hz: u8,
    filter: SentenceFilter,
) -> Result<(), GpsConfigError> {
    UpdateRate::try_from(rate_hz)?;
    set_update_rate(port, rate_hz)?;
    delay.delay_ms(STEP_SETTLE_MS);
    set_sentence_filter(port, delay, filter)?;
    delay.delay_ms(STEP_SETTLE_MS);
    port.flush()?;
    delay.delay_ms(STEP_SETTLE_MS);
    Ok(())
}
