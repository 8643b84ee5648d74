//! System configuration parameters
//!
//! All tunable parameters for the speed monitor.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::drivers::alert_pattern::AlertTiming;
use crate::gps::commands::SentenceFilter;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Threshold monitor ---
    /// Speed (km/h) above which a crossing is counted
    pub speed_threshold_kmh: f32,
    /// Speeds below this (km/h) are treated as stationary
    pub movement_floor_kmh: f32,

    // --- Receiver ---
    /// Position fix rate requested from the receiver (1-5 Hz)
    pub gps_update_rate_hz: u8,
    /// Sentences the receiver is told to emit
    pub gps_sentences: SentenceFilter,

    // --- Speed filter ---
    /// Run the Kalman stage on the converted speed
    pub filter_enabled: bool,
    /// Process noise Q
    pub filter_process_noise: f32,
    /// Measurement noise R (replaced by the HDOP-derived value when scaling is on)
    pub filter_measurement_noise: f32,
    /// Derive R from the latest HDOP
    pub filter_hdop_scaling: bool,

    // --- Timing ---
    /// UART read timeout per decoder cycle (milliseconds)
    pub gps_read_timeout_ms: u32,
    /// Idle time between decoder cycles (milliseconds)
    pub gps_idle_ms: u32,
    /// Threshold monitor period (milliseconds)
    pub monitor_period_ms: u32,
    /// Monitor wait while no sentences / no RMC arrive (milliseconds)
    pub no_signal_backoff_ms: u32,
    /// Monitor wait while RMC reports no fix (milliseconds)
    pub no_fix_backoff_ms: u32,
    /// On-time per display digit (milliseconds)
    pub display_digit_ms: u32,

    // --- Buzzer ---
    pub alert: AlertTiming,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Monitor
            speed_threshold_kmh: 30.0,
            movement_floor_kmh: 5.0,

            // Receiver
            gps_update_rate_hz: 5,
            gps_sentences: SentenceFilter::RmcAndGga,

            // Filter (off until field-calibrated)
            filter_enabled: false,
            filter_process_noise: 0.05,
            filter_measurement_noise: 1.0,
            filter_hdop_scaling: true,

            // Timing
            gps_read_timeout_ms: 100,
            gps_idle_ms: 10,
            monitor_period_ms: 40,
            no_signal_backoff_ms: 300,
            no_fix_backoff_ms: 200,
            display_digit_ms: 6, // 3 digits → ~55 Hz refresh

            alert: AlertTiming::default(),
        }
    }
}
