// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Keypoint set type and anatomical index constants.
//!
//! Pose detectors emit 17 body-joint locations in a fixed COCO ordering.
//! The ordering is semantically meaningful: index 0 is the nose, 5/6 are
//! the shoulders, 11/12 are the hips, and so on. [`KeypointSet`] enforces
//! the count and finiteness invariants at construction so the rest of the
//! pipeline never has to re-check them.

use ndarray::Array2;

use crate::error::{ClassifyError, Result};

/// Number of keypoints in a pose (COCO topology).
pub const NUM_KEYPOINTS: usize = 17;

/// Anatomical keypoint indices in the fixed COCO ordering.
pub mod index {
    /// Nose.
    pub const NOSE: usize = 0;
    /// Left eye.
    pub const LEFT_EYE: usize = 1;
    /// Right eye.
    pub const RIGHT_EYE: usize = 2;
    /// Left ear.
    pub const LEFT_EAR: usize = 3;
    /// Right ear.
    pub const RIGHT_EAR: usize = 4;
    /// Left shoulder.
    pub const LEFT_SHOULDER: usize = 5;
    /// Right shoulder.
    pub const RIGHT_SHOULDER: usize = 6;
    /// Left elbow.
    pub const LEFT_ELBOW: usize = 7;
    /// Right elbow.
    pub const RIGHT_ELBOW: usize = 8;
    /// Left wrist.
    pub const LEFT_WRIST: usize = 9;
    /// Right wrist.
    pub const RIGHT_WRIST: usize = 10;
    /// Left hip.
    pub const LEFT_HIP: usize = 11;
    /// Right hip.
    pub const RIGHT_HIP: usize = 12;
    /// Left knee.
    pub const LEFT_KNEE: usize = 13;
    /// Right knee.
    pub const RIGHT_KNEE: usize = 14;
    /// Left ankle.
    pub const LEFT_ANKLE: usize = 15;
    /// Right ankle.
    pub const RIGHT_ANKLE: usize = 16;
}

/// An ordered set of exactly 17 `(x, y)` keypoints.
///
/// Coordinates are expected in the detector's image-normalized `[0, 1]`
/// range, though the normalization pipeline only requires them to be
/// finite. Stored as a `(17, 2)` array in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointSet {
    /// Raw keypoint data with shape (17, 2).
    data: Array2<f32>,
}

impl KeypointSet {
    /// Create a keypoint set from `(x, y)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidInput`] if the slice does not contain
    /// exactly 17 points or any coordinate is NaN/infinite.
    pub fn from_pairs(pairs: &[[f32; 2]]) -> Result<Self> {
        if pairs.len() != NUM_KEYPOINTS {
            return Err(ClassifyError::InvalidInput(format!(
                "expected {NUM_KEYPOINTS} keypoints, got {}",
                pairs.len()
            )));
        }

        for (i, p) in pairs.iter().enumerate() {
            if !p[0].is_finite() || !p[1].is_finite() {
                return Err(ClassifyError::InvalidInput(format!(
                    "keypoint {i} has non-finite coordinates ({}, {})",
                    p[0], p[1]
                )));
            }
        }

        let flat: Vec<f32> = pairs.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((NUM_KEYPOINTS, 2), flat)
            .map_err(|e| ClassifyError::InvalidInput(format!("bad keypoint shape: {e}")))?;

        Ok(Self { data })
    }

    /// Get a single keypoint as `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 17`; use the [`index`] constants.
    #[must_use]
    pub fn point(&self, i: usize) -> (f32, f32) {
        (self.data[[i, 0]], self.data[[i, 1]])
    }

    /// Midpoint of the left and right hips.
    #[must_use]
    pub fn hip_center(&self) -> (f32, f32) {
        Self::midpoint(
            self.point(index::LEFT_HIP),
            self.point(index::RIGHT_HIP),
        )
    }

    /// Midpoint of the left and right shoulders.
    #[must_use]
    pub fn shoulder_center(&self) -> (f32, f32) {
        Self::midpoint(
            self.point(index::LEFT_SHOULDER),
            self.point(index::RIGHT_SHOULDER),
        )
    }

    /// View of the underlying `(17, 2)` array.
    #[must_use]
    pub fn xy(&self) -> &Array2<f32> {
        &self.data
    }

    fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
        (f32::midpoint(a.0, b.0), f32::midpoint(a.1, b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_pose() -> Vec<[f32; 2]> {
        (0..NUM_KEYPOINTS)
            .map(|i| [0.1 + 0.04 * i as f32, 0.2 + 0.03 * i as f32])
            .collect()
    }

    #[test]
    fn test_exact_count_required() {
        let short = grid_pose()[..16].to_vec();
        let result = KeypointSet::from_pairs(&short);
        assert!(matches!(
            result.unwrap_err(),
            ClassifyError::InvalidInput(_)
        ));

        let mut long = grid_pose();
        long.push([0.5, 0.5]);
        assert!(KeypointSet::from_pairs(&long).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut pairs = grid_pose();
        pairs[3][1] = f32::NAN;
        assert!(KeypointSet::from_pairs(&pairs).is_err());

        let mut pairs = grid_pose();
        pairs[9][0] = f32::INFINITY;
        assert!(KeypointSet::from_pairs(&pairs).is_err());
    }

    #[test]
    fn test_centers() {
        let mut pairs = grid_pose();
        pairs[index::LEFT_HIP] = [0.4, 0.6];
        pairs[index::RIGHT_HIP] = [0.6, 0.6];
        pairs[index::LEFT_SHOULDER] = [0.4, 0.4];
        pairs[index::RIGHT_SHOULDER] = [0.6, 0.4];
        let kps = KeypointSet::from_pairs(&pairs).unwrap();

        let (hx, hy) = kps.hip_center();
        assert!((hx - 0.5).abs() < f32::EPSILON);
        assert!((hy - 0.6).abs() < f32::EPSILON);

        let (sx, sy) = kps.shoulder_center();
        assert!((sx - 0.5).abs() < f32::EPSILON);
        assert!((sy - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_point_ordering() {
        let pairs = grid_pose();
        let kps = KeypointSet::from_pairs(&pairs).unwrap();
        assert_eq!(kps.point(index::NOSE), (pairs[0][0], pairs[0][1]));
        assert_eq!(
            kps.point(index::RIGHT_ANKLE),
            (pairs[16][0], pairs[16][1])
        );
    }
}
