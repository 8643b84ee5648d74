//! Application core: pure domain logic, zero I/O.
//!
//! The threshold monitor and its alert side effects.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
