//! One-shot hardware peripheral initialization.
//!
//! Configures every GPIO output (buzzer, LED, GPS reset, display lines)
//! using raw ESP-IDF sys calls and drives each to its idle level.  Called
//! once from `main()` before any worker starts.  The GPS UART itself is
//! owned by [`UartSerial`](crate::adapters::uart::UartSerial).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

/// Output pins and the level each starts at.
pub const IDLE_LEVELS: [(i32, bool); 11] = [
    (pins::BUZZER_GPIO, true), // active-low: HIGH = silent
    (pins::LED_GPIO, false),
    (pins::GPS_RESET_GPIO, true), // out of reset
    (pins::DISPLAY_BCD_GPIOS[0], false),
    (pins::DISPLAY_BCD_GPIOS[1], false),
    (pins::DISPLAY_BCD_GPIOS[2], false),
    (pins::DISPLAY_BCD_GPIOS[3], false),
    (pins::DISPLAY_DIGIT_GPIOS[0], false),
    (pins::DISPLAY_DIGIT_GPIOS[1], false),
    (pins::DISPLAY_DIGIT_GPIOS[2], false),
    (pins::DISPLAY_DP_GPIO, false),
];

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any worker is spawned.
    unsafe { init_gpio_outputs()? };
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &(pin, level) in &IDLE_LEVELS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, u32::from(level)) };
    }

    info!("hw_init: GPIO outputs configured ({} pins)", IDLE_LEVELS.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output pin configured in
    // init_gpio_outputs(); each pin has a single owning driver.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}
