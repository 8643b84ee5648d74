//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured monitor events to the
//! ESP-IDF logger (UART console in production).  Diagnostics are logged
//! when they change, not on every tick, so a disconnected receiver does
//! not flood the console.

use log::{info, warn};

use crate::app::events::{Diagnostic, MonitorEvent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`MonitorEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    last_diagnostic: Option<Diagnostic>,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &MonitorEvent) {
        match event {
            MonitorEvent::Diagnostic(diag) => {
                if self.last_diagnostic != Some(*diag) {
                    warn!("DIAG  | {}", diag.as_str());
                    self.last_diagnostic = Some(*diag);
                }
            }
            MonitorEvent::FixAcquired => {
                self.last_diagnostic = None;
                info!("DIAG  | valid fix");
            }
            MonitorEvent::Started { counter } => {
                info!("START | counter={}", counter);
            }
            MonitorEvent::Crossing { counter, speed_kmh } => {
                info!("CROSS | #{} at {:.1} km/h", counter, speed_kmh);
            }
            MonitorEvent::BelowThreshold { speed_kmh } => {
                info!("BELOW | {:.1} km/h", speed_kmh);
            }
            MonitorEvent::CounterReset => {
                info!("RESET | counter=0");
            }
            MonitorEvent::PersistFailed { counter, error } => {
                warn!("STORE | counter={} not saved: {}", counter, error);
            }
            MonitorEvent::ThresholdChanged { threshold_kmh } => {
                info!("CONF  | threshold={:.1} km/h", threshold_kmh);
            }
            MonitorEvent::MovementFloorChanged { floor_kmh } => {
                info!("CONF  | movement floor={:.1} km/h", floor_kmh);
            }
            MonitorEvent::CommandRejected(reason) => {
                warn!("CONF  | rejected: {}", reason);
            }
        }
    }
}
