//! Hardware adapter: bridges real peripherals to the actuator port.
//!
//! Owns the buzzer and status LED drivers.  The display value goes to
//! [`SharedState`], where the display worker picks it up; this adapter
//! never touches the display pins itself.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use std::sync::Arc;

use log::info;

use crate::app::ports::ActuatorPort;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::status_led::StatusLed;
use crate::shared::SharedState;

/// Concrete adapter that combines all monitor outputs behind [`ActuatorPort`].
pub struct HardwareAdapter {
    buzzer: Buzzer,
    led: StatusLed,
    shared: Arc<SharedState>,
}

impl HardwareAdapter {
    pub fn new(buzzer: Buzzer, led: StatusLed, shared: Arc<SharedState>) -> Self {
        Self { buzzer, led, shared }
    }

    pub fn buzzer(&self) -> &Buzzer {
        &self.buzzer
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

impl ActuatorPort for HardwareAdapter {
    fn buzzer_on(&mut self) {
        self.buzzer.on();
    }

    fn buzzer_off(&mut self) {
        self.buzzer.off();
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
        info!("LED {}", if on { "on" } else { "off" });
    }

    fn set_display_value(&mut self, value: u32) {
        self.shared.set_display_value(value);
    }
}
