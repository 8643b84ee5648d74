//! Actuator drivers, hardware initialisation, and worker helpers.

pub mod alert_pattern;
pub mod buzzer;
pub mod display_7seg;
pub mod hw_init;
pub mod pacing;
pub mod status_led;
pub mod task_pin;
