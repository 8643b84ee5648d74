//! Signal conditioning.

pub mod kalman;
