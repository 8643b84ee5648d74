//! Speedwatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, with host
//! simulations standing in for the UART, NVS and GPIO.
//!
//! ```text
//!  UART ─▶ gps::GpsReceiver ─▶ SharedState ─▶ app::SpeedMonitor ─▶ buzzer
//!          (nmea decoder,       (snapshot,      (gating, edges,      display value
//!           Kalman stage)        commands)        counter)            NVS counter
//! ```

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod gps;
pub mod nmea;
pub mod pins;
pub mod shared;
pub mod units;

pub mod adapters;
pub mod drivers;
