//! Yaw sources
//!
//! The publisher only needs "give me a yaw in radians now". A camera tracker,
//! a filtered estimator or a test closure all fit behind [`YawSource`].

use chrono::Utc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum YawError {
    #[error("Yaw is not finite: {0}")]
    NonFinite(f64),
    #[error("Yaw source unavailable: {0}")]
    Unavailable(String),
}

pub trait YawSource {
    /// Current yaw in radians; any finite value, no wrapping required
    fn sample_yaw(&mut self) -> Result<f64, YawError>;
}

impl<F> YawSource for F
where
    F: FnMut() -> f64,
{
    fn sample_yaw(&mut self) -> Result<f64, YawError> {
        Ok(self())
    }
}

/// Tracker stand-in: `amplitude · sin(t · rate)`, t in wall-clock seconds
#[derive(Debug, Clone, Copy)]
pub struct SineSweep {
    pub amplitude_rad: f64,
    pub angular_rate: f64,
}

impl SineSweep {
    pub fn at(&self, t_seconds: f64) -> f64 {
        self.amplitude_rad * (t_seconds * self.angular_rate).sin()
    }
}

impl Default for SineSweep {
    fn default() -> Self {
        Self {
            amplitude_rad: 0.3,
            angular_rate: 0.5,
        }
    }
}

impl YawSource for SineSweep {
    fn sample_yaw(&mut self) -> Result<f64, YawError> {
        let now = Utc::now();
        let t = now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) * 1e-6;
        Ok(self.at(t))
    }
}
