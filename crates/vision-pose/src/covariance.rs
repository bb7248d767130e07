//! Upper-triangular packed 6x6 pose covariance

use serde::{Deserialize, Serialize};

use crate::UNKNOWN_VARIANCE;

/// Packed length of a symmetric 6x6 matrix
pub const POSE_COVARIANCE_LEN: usize = 21;

/// Packed positions of x, y, z, roll, pitch, yaw variances
pub const DIAGONAL_INDICES: [usize; 6] = [0, 6, 11, 15, 18, 20];

const DOF: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Covariance([f64; POSE_COVARIANCE_LEN]);

impl Covariance {
    pub const fn from_packed(values: [f64; POSE_COVARIANCE_LEN]) -> Self {
        Self(values)
    }

    /// Diagonal matrix over (x, y, z, roll, pitch, yaw), zero off-diagonal
    pub fn diagonal(variances: &[f64; DOF]) -> Self {
        let mut packed = [0.0; POSE_COVARIANCE_LEN];
        for (&index, &variance) in DIAGONAL_INDICES.iter().zip(variances) {
            packed[index] = variance;
        }
        Self(packed)
    }

    /// Everything unknown except yaw
    pub fn yaw_only(yaw_variance: f64) -> Self {
        Self::diagonal(&[
            UNKNOWN_VARIANCE,
            UNKNOWN_VARIANCE,
            UNKNOWN_VARIANCE,
            UNKNOWN_VARIANCE,
            UNKNOWN_VARIANCE,
            yaw_variance,
        ])
    }

    /// Packed index of (row, col); symmetric, so (col, row) maps to the same slot
    pub fn index(row: usize, col: usize) -> Option<usize> {
        if row >= DOF || col >= DOF {
            return None;
        }
        let (r, c) = if row <= col { (row, col) } else { (col, row) };
        let row_start = r * (2 * DOF - r + 1) / 2;
        Some(row_start + (c - r))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        Self::index(row, col).map(|i| self.0[i])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_packed(self) -> [f64; POSE_COVARIANCE_LEN] {
        self.0
    }
}

impl Default for Covariance {
    fn default() -> Self {
        Self([0.0; POSE_COVARIANCE_LEN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_indices_match_packing() {
        for (dof, &expected) in DIAGONAL_INDICES.iter().enumerate() {
            assert_eq!(Covariance::index(dof, dof), Some(expected));
        }
    }

    #[test]
    fn test_index_is_symmetric() {
        assert_eq!(Covariance::index(0, 5), Some(5));
        assert_eq!(Covariance::index(5, 0), Some(5));
        assert_eq!(Covariance::index(1, 2), Some(7));
        assert_eq!(Covariance::index(4, 5), Some(19));
        assert_eq!(Covariance::index(6, 0), None);
        assert_eq!(Covariance::index(0, 6), None);
    }

    #[test]
    fn test_index_covers_every_slot_once() {
        let mut seen = [false; POSE_COVARIANCE_LEN];
        for row in 0..DOF {
            for col in row..DOF {
                let i = Covariance::index(row, col).unwrap();
                assert!(!seen[i], "slot {} visited twice", i);
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_yaw_only_layout() {
        let cov = Covariance::yaw_only(0.5);
        let expected = [
            1e6, 0.0, 0.0, 0.0, 0.0, 0.0, //
            1e6, 0.0, 0.0, 0.0, 0.0, //
            1e6, 0.0, 0.0, 0.0, //
            1e6, 0.0, 0.0, //
            1e6, 0.0, //
            0.5,
        ];
        assert_eq!(cov.into_packed(), expected);
        assert_eq!(cov.get(5, 5), Some(0.5));
        assert_eq!(cov.get(2, 4), Some(0.0));
    }
}
