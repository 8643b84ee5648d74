//! Single status LED on a plain GPIO.
//!
//! On ESP-IDF: drives the pin via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct StatusLed {
    on: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::LED_GPIO, on);
        self.on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.on);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
