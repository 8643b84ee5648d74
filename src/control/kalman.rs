//! One-dimensional Kalman filter for the ground-speed signal
//!
//! Constant-value model: prediction only grows the error covariance by the
//! process noise; each measurement is blended in by the Kalman gain.
//! State lives for the process lifetime and is never persisted.

/// Lower bound on the HDOP-derived measurement noise.
pub const MIN_MEASUREMENT_NOISE: f32 = 0.5;

/// Measurement noise per unit of HDOP.
pub const HDOP_NOISE_SCALE: f32 = 0.5;

/// Scalar Kalman filter over speed (km/h).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedFilter {
    estimate: f32,
    covariance: f32,
    process_noise: f32,
    measurement_noise: f32,
}

impl SpeedFilter {
    /// Start at estimate 0 with unit covariance.
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            estimate: 0.0,
            covariance: 1.0,
            process_noise,
            measurement_noise,
        }
    }

    /// Blend a new measurement in and return the updated estimate.
    pub fn update(&mut self, measurement: f32) -> f32 {
        self.covariance += self.process_noise;
        let gain = self.covariance / (self.covariance + self.measurement_noise);
        self.estimate += gain * (measurement - self.estimate);
        self.covariance *= 1.0 - gain;
        self.estimate
    }

    /// Trust measurements less when the fix geometry is poor.
    ///
    /// R = max(0.5, hdop × 0.5).
    pub fn scale_for_hdop(&mut self, hdop: f32) {
        self.measurement_noise = (hdop * HDOP_NOISE_SCALE).max(MIN_MEASUREMENT_NOISE);
    }

    pub fn set_measurement_noise(&mut self, r: f32) {
        self.measurement_noise = r;
    }

    pub fn estimate(&self) -> f32 {
        self.estimate
    }

    pub fn covariance(&self) -> f32 {
        self.covariance
    }

    pub fn measurement_noise(&self) -> f32 {
        self.measurement_noise
    }

    /// Back to the initial state, keeping the noise coefficients.
    pub fn reset(&mut self) {
        self.estimate = 0.0;
        self.covariance = 1.0;
    }
}
