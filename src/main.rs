//! Speedwatch Firmware: Main Entry Point
//!
//! Bring-up, then three free-running workers sharing one [`SharedState`].
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartSerial     HardwareAdapter   LogEventSink   NvsAdapter    │
//! │  (SerialPort)   (ActuatorPort)    (EventSink)    (Config+Ctr)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  gps worker  ──▶ SharedState ──▶ monitor worker                │
//! │  (core 0, p5)    (snapshots,     (core 0, p4)                  │
//! │                   commands,                                    │
//! │                   display value) ──▶ display worker (core 1)   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{debug, error, info, warn};

use speedwatch::adapters::hardware::HardwareAdapter;
use speedwatch::adapters::log_sink::LogEventSink;
use speedwatch::adapters::nvs::NvsAdapter;
use speedwatch::adapters::time::Esp32TimeAdapter;
use speedwatch::adapters::uart::UartSerial;
use speedwatch::app::ports::{ActuatorPort, Clock, ConfigPort};
use speedwatch::app::service::SpeedMonitor;
use speedwatch::config::SystemConfig;
use speedwatch::drivers::buzzer::Buzzer;
use speedwatch::drivers::display_7seg::SevenSegDisplay;
use speedwatch::drivers::hw_init;
use speedwatch::drivers::pacing::Periodic;
use speedwatch::drivers::status_led::StatusLed;
use speedwatch::drivers::task_pin::{self, DISPLAY_TASK, GPS_TASK, MONITOR_TASK};
use speedwatch::error::Error;
use speedwatch::gps::{GpsReceiver, commands};
use speedwatch::pins;
use speedwatch::shared::SharedState;

/// Receiver power-on settle before it accepts PMTK commands.
const RECEIVER_BOOT_MS: u32 = 1000;

fn sleep_ms(ms: u64) {
    if ms > 0 {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Speedwatch v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Persistent storage + config ────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            error!("NVS init failed ({}), halting", e);
            return Err(Error::from(e).into());
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Peripherals: GPIO idle levels, GPS UART ────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let peripherals = Peripherals::take()?;
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio25,
        peripherals.pins.gpio26,
        Option::<esp_idf_hal::gpio::AnyIOPin>::None,
        Option::<esp_idf_hal::gpio::AnyIOPin>::None,
        &UartConfig::new()
            .baudrate(Hertz(pins::GPS_BAUD))
            .rx_fifo_size(pins::GPS_RX_BUFFER_BYTES),
    )?;
    let mut serial = UartSerial::new(uart);
    info!(
        "GPS UART1 up (TX={}, RX={}, {} baud)",
        pins::GPS_UART_TX_GPIO,
        pins::GPS_UART_RX_GPIO,
        pins::GPS_BAUD
    );

    let shared = Arc::new(SharedState::new());
    let mut hw = HardwareAdapter::new(Buzzer::new(), StatusLed::new(), Arc::clone(&shared));

    // ── 4. Receiver configuration (LED on while it runs) ──────
    hw.set_led(true);
    let mut delay = FreeRtos;
    FreeRtos::delay_ms(RECEIVER_BOOT_MS);
    match commands::configure(
        &mut serial,
        &mut delay,
        config.gps_update_rate_hz,
        config.gps_sentences,
    ) {
        Ok(()) => info!(
            "GPS configured: {} Hz, {:?}",
            config.gps_update_rate_hz, config.gps_sentences
        ),
        // The receiver keeps its own defaults; decoding still works at 1 Hz.
        Err(e) => warn!("GPS configuration failed: {}", e),
    }
    hw.set_led(false);

    info!(
        "Threshold {:.1} km/h, movement floor {:.1} km/h, filter {}",
        config.speed_threshold_kmh,
        config.movement_floor_kmh,
        if config.filter_enabled { "on" } else { "off" }
    );

    let clock = Esp32TimeAdapter::new();

    // ── 5. Display worker (core 1) ────────────────────────────
    let display_shared = Arc::clone(&shared);
    let digit_ms = config.display_digit_ms;
    let display = task_pin::spawn_on_core(DISPLAY_TASK, move || {
        let mut display = SevenSegDisplay::new();
        let mut pace = Periodic::new(clock.now_ms(), digit_ms);
        loop {
            display.step(display_shared.display_value());
            sleep_ms(pace.wait_ms(clock.now_ms()));
        }
    })?;

    // ── 6. Decoder worker ─────────────────────────────────────
    let gps_shared = Arc::clone(&shared);
    let mut receiver = GpsReceiver::new(serial, &config);
    let idle_ms = u64::from(config.gps_idle_ms);
    let gps = task_pin::spawn_on_core(GPS_TASK, move || {
        loop {
            // retried next cycle
            if let Err(e) = receiver.poll(&gps_shared) {
                debug!("gps: poll failed: {:?}", e);
            }
            sleep_ms(idle_ms);
        }
    })?;

    // ── 7. Monitor worker ─────────────────────────────────────
    let monitor_shared = Arc::clone(&shared);
    let monitor_config = config.clone();
    let mut store = nvs;
    let monitor = task_pin::spawn_on_core(MONITOR_TASK, move || {
        let mut sink = LogEventSink::new();
        let mut monitor = SpeedMonitor::new(&monitor_config);
        monitor.start(&mut hw, &store, &mut sink);

        let mut pace = Periodic::new(clock.now_ms(), monitor_config.monitor_period_ms);
        loop {
            let now = clock.now_ms();
            let status = monitor.run_cycle(&monitor_shared, now, &mut hw, &mut store, &mut sink);
            pace.set_period(now, status.wait_ms(&monitor_config));
            sleep_ms(pace.wait_ms(clock.now_ms()));
        }
    })?;

    info!("System ready.");

    // Workers never return; joining keeps main's stack frame alive.
    for handle in [gps, monitor, display] {
        if handle.join().is_err() {
            error!("worker panicked");
        }
    }
    Ok(())
}
