//! Inbound commands to the monitor.
//!
//! Queued on [`SharedState`](crate::shared::SharedState) by whoever owns the
//! user interface and drained by the monitor worker at the start of each
//! tick.

/// Commands that external adapters can send into the monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorCommand {
    /// Zero the crossing counter and persist it.
    ResetCounter,

    /// New speed threshold in km/h.
    SetThreshold(f32),

    /// New movement floor in km/h.
    SetMovementFloor(f32),
}
