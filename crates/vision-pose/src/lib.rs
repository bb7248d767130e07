//! Vision Pose Library
//!
//! Yaw-only external vision estimates for a flight controller:
//! position and roll/pitch are pinned to zero with an "unknown" variance,
//! yaw carries a trusted (3°)² variance.
//!
//! # Covariance Layout
//!
//! ```text
//!         x     y     z     roll  pitch yaw
//! x      [0]    1     2     3     4     5
//! y            [6]    7     8     9     10
//! z                  [11]   12    13    14
//! roll                     [15]   16    17
//! pitch                          [18]   19
//! yaw                                  [20]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod codec;
pub mod covariance;

pub use covariance::{Covariance, DIAGONAL_INDICES, POSE_COVARIANCE_LEN};

/// Variance marking a degree of freedom the estimator should ignore
pub const UNKNOWN_VARIANCE: f64 = 1e6;

/// Yaw standard deviation reported with every estimate (degrees)
pub const YAW_STDDEV_DEG: f64 = 3.0;

/// (3°)² expressed in rad²
pub const YAW_VARIANCE_RAD2: f64 =
    (YAW_STDDEV_DEG * std::f64::consts::PI / 180.0) * (YAW_STDDEV_DEG * std::f64::consts::PI / 180.0);

#[derive(Error, Debug)]
pub enum PoseError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PoseError>;

/// Body-frame position (meters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionBody {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

/// Body-frame orientation (radians)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleBody {
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
}

/// One vision position estimate, built per tick and sent once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    time_usec: u64,
    position_body: PositionBody,
    angle_body: AngleBody,
    pose_covariance: Covariance,
}

impl PoseEstimate {
    pub fn new(
        time_usec: u64,
        position_body: PositionBody,
        angle_body: AngleBody,
        pose_covariance: Covariance,
    ) -> Self {
        Self {
            time_usec,
            position_body,
            angle_body,
            pose_covariance,
        }
    }

    /// Zero position, zero roll/pitch, the given yaw and the fixed yaw-only covariance
    pub fn yaw_only(yaw_rad: f64, time_usec: u64) -> Self {
        Self::new(
            time_usec,
            PositionBody::default(),
            AngleBody {
                roll_rad: 0.0,
                pitch_rad: 0.0,
                yaw_rad,
            },
            Covariance::yaw_only(YAW_VARIANCE_RAD2),
        )
    }

    pub fn time_usec(&self) -> u64 {
        self.time_usec
    }

    pub fn position_body(&self) -> PositionBody {
        self.position_body
    }

    pub fn angle_body(&self) -> AngleBody {
        self.angle_body
    }

    pub fn pose_covariance(&self) -> &Covariance {
        &self.pose_covariance
    }

    pub fn yaw(&self) -> f64 {
        self.angle_body.yaw_rad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_variance_constant() {
        // (3°)² in rad² to six significant figures
        assert!((YAW_VARIANCE_RAD2 - 0.00274156).abs() < 1e-8);
        assert_eq!(format!("{:.6}", YAW_VARIANCE_RAD2), "0.002742");
    }

    #[test]
    fn test_yaw_only_shape() {
        let estimate = PoseEstimate::yaw_only(0.25, 1_700_000_000_000_000);

        assert_eq!(estimate.time_usec(), 1_700_000_000_000_000);
        assert_eq!(estimate.position_body(), PositionBody::default());
        assert_eq!(estimate.angle_body().roll_rad, 0.0);
        assert_eq!(estimate.angle_body().pitch_rad, 0.0);
        assert_eq!(estimate.yaw(), 0.25);

        let cov = estimate.pose_covariance();
        for &i in &DIAGONAL_INDICES[..5] {
            assert_eq!(cov.as_slice()[i], UNKNOWN_VARIANCE);
        }
        assert_eq!(cov.as_slice()[20], YAW_VARIANCE_RAD2);
    }

    #[test]
    fn test_yaw_outside_half_turn_is_kept() {
        // No wrapping: the estimator accepts any finite radian value
        let estimate = PoseEstimate::yaw_only(7.5, 0);
        assert_eq!(estimate.yaw(), 7.5);

        let estimate = PoseEstimate::yaw_only(-12.0, 0);
        assert_eq!(estimate.yaw(), -12.0);
    }
}

// ============================================================================
// Property-based Tests
// ============================================================================
