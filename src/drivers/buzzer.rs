//! Active-low buzzer driver.
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers (LOW = sounding).
//! On host/test: tracks state in-memory only.

use log::trace;

use crate::drivers::hw_init;
use crate::pins;

pub struct Buzzer {
    on: bool,
}

impl Buzzer {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn on(&mut self) {
        hw_init::gpio_write(pins::BUZZER_GPIO, false);
        self.on = true;
        trace!("buzzer on");
    }

    pub fn off(&mut self) {
        hw_init::gpio_write(pins::BUZZER_GPIO, true);
        self.on = false;
        trace!("buzzer off");
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}
