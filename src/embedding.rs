// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Pose normalization: keypoints → position/scale-invariant embedding.
//!
//! The classifier never sees raw keypoints. They are first centered on the
//! hip midpoint (translation invariance) and divided by a pose size derived
//! from the torso length and the body extent (scale invariance), so the
//! same pose performed near or far from the camera, or off-center in
//! frame, yields a comparable embedding.

use ndarray::Array1;

use crate::error::{ClassifyError, Result};
use crate::keypoints::{KeypointSet, NUM_KEYPOINTS};

/// Length of a flattened pose embedding (17 keypoints × 2 coordinates).
pub const EMBEDDING_LEN: usize = NUM_KEYPOINTS * 2;

/// Empirical multiplier applied to the torso length when deriving the
/// normalization scale. Matches the constant the classifier was trained
/// with; changing it invalidates the model artifact.
const TORSO_SIZE_MULTIPLIER: f32 = 2.5;

/// Pose sizes at or below this are treated as degenerate geometry.
const MIN_POSE_SIZE: f32 = 1e-6;

/// A position- and scale-invariant pose embedding.
///
/// 34 finite floats, the `(17, 2)` normalized keypoint matrix flattened
/// row-major. Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEmbedding {
    data: Array1<f32>,
}

impl PoseEmbedding {
    /// Wrap an already-normalized 34-element vector.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidInput`] if the vector is not exactly
    /// 34 elements or contains non-finite values.
    pub fn from_vec(data: Vec<f32>) -> Result<Self> {
        if data.len() != EMBEDDING_LEN {
            return Err(ClassifyError::InvalidInput(format!(
                "expected embedding of {EMBEDDING_LEN} elements, got {}",
                data.len()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ClassifyError::InvalidInput(
                "embedding contains non-finite values".to_string(),
            ));
        }
        Ok(Self {
            data: Array1::from_vec(data),
        })
    }

    /// Number of elements (always 34).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the embedding is empty (never true for a valid embedding).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The embedding values in row-major keypoint order.
    ///
    /// # Panics
    ///
    /// Does not panic; the backing array is always contiguous.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().expect("embedding is contiguous")
    }

    /// View as an ndarray vector.
    #[must_use]
    pub fn as_array(&self) -> &Array1<f32> {
        &self.data
    }
}

/// Normalize a keypoint set into a [`PoseEmbedding`].
///
/// Steps:
/// 1. hip center = midpoint(left hip, right hip)
/// 2. shoulder center = midpoint(left shoulder, right shoulder)
/// 3. `torso_size` = |shoulder center − hip center|
/// 4. `max_dist` = max distance from hip center to any keypoint
/// 5. `pose_size = max(torso_size × 2.5, max_dist)`
/// 6. shift every keypoint by −hip center, divide by `pose_size`
/// 7. flatten the `(17, 2)` matrix row-major into 34 values
///
/// # Errors
///
/// Returns [`ClassifyError::DegenerateInput`] when all keypoints are
/// coincident (`pose_size` ≈ 0), so the division step never produces
/// NaN or infinity.
pub fn normalize(keypoints: &KeypointSet) -> Result<PoseEmbedding> {
    let (hip_x, hip_y) = keypoints.hip_center();
    let (shoulder_x, shoulder_y) = keypoints.shoulder_center();

    let torso_size = distance(shoulder_x, shoulder_y, hip_x, hip_y);

    let mut max_dist = 0.0f32;
    for row in keypoints.xy().rows() {
        let d = distance(row[0], row[1], hip_x, hip_y);
        if d > max_dist {
            max_dist = d;
        }
    }

    let pose_size = (torso_size * TORSO_SIZE_MULTIPLIER).max(max_dist);
    if !pose_size.is_finite() || pose_size <= MIN_POSE_SIZE {
        return Err(ClassifyError::DegenerateInput(format!(
            "pose size {pose_size} too small to normalize (all keypoints coincident?)"
        )));
    }

    let mut data = Vec::with_capacity(EMBEDDING_LEN);
    for row in keypoints.xy().rows() {
        data.push((row[0] - hip_x) / pose_size);
        data.push((row[1] - hip_y) / pose_size);
    }

    Ok(PoseEmbedding {
        data: Array1::from_vec(data),
    })
}

fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::index;

    const TOL: f32 = 1e-5;

    /// A symmetric standing pose: hips at (0.5, 0.6), shoulders at
    /// (0.5, 0.4), remaining points symmetric about x = 0.5.
    fn standing_pose() -> Vec<[f32; 2]> {
        let mut p = vec![[0.5, 0.5]; NUM_KEYPOINTS];
        p[index::NOSE] = [0.5, 0.3];
        p[index::LEFT_EYE] = [0.48, 0.28];
        p[index::RIGHT_EYE] = [0.52, 0.28];
        p[index::LEFT_EAR] = [0.46, 0.3];
        p[index::RIGHT_EAR] = [0.54, 0.3];
        p[index::LEFT_SHOULDER] = [0.44, 0.4];
        p[index::RIGHT_SHOULDER] = [0.56, 0.4];
        p[index::LEFT_ELBOW] = [0.42, 0.5];
        p[index::RIGHT_ELBOW] = [0.58, 0.5];
        p[index::LEFT_WRIST] = [0.41, 0.58];
        p[index::RIGHT_WRIST] = [0.59, 0.58];
        p[index::LEFT_HIP] = [0.46, 0.6];
        p[index::RIGHT_HIP] = [0.54, 0.6];
        p[index::LEFT_KNEE] = [0.46, 0.75];
        p[index::RIGHT_KNEE] = [0.54, 0.75];
        p[index::LEFT_ANKLE] = [0.46, 0.9];
        p[index::RIGHT_ANKLE] = [0.54, 0.9];
        p
    }

    fn embed(pairs: &[[f32; 2]]) -> PoseEmbedding {
        let kps = KeypointSet::from_pairs(pairs).unwrap();
        normalize(&kps).unwrap()
    }

    fn assert_close(a: &PoseEmbedding, b: &PoseEmbedding) {
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < TOL, "{x} vs {y}");
        }
    }

    #[test]
    fn test_embedding_is_34_finite_values() {
        let emb = embed(&standing_pose());
        assert_eq!(emb.len(), EMBEDDING_LEN);
        assert!(emb.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_hip_center_maps_to_origin() {
        let emb = embed(&standing_pose());
        let v = emb.as_slice();
        // Hips straddle the origin symmetrically after centering.
        let hip_mid_x = f32::midpoint(v[2 * index::LEFT_HIP], v[2 * index::RIGHT_HIP]);
        let hip_mid_y =
            f32::midpoint(v[2 * index::LEFT_HIP + 1], v[2 * index::RIGHT_HIP + 1]);
        assert!(hip_mid_x.abs() < TOL);
        assert!(hip_mid_y.abs() < TOL);
    }

    #[test]
    fn test_translation_invariance() {
        let base = standing_pose();
        let shifted: Vec<[f32; 2]> =
            base.iter().map(|p| [p[0] + 0.17, p[1] - 0.09]).collect();
        assert_close(&embed(&base), &embed(&shifted));
    }

    #[test]
    fn test_scale_invariance() {
        let base = standing_pose();
        for s in [0.25f32, 0.5, 2.0, 7.5] {
            let scaled: Vec<[f32; 2]> =
                base.iter().map(|p| [p[0] * s, p[1] * s]).collect();
            assert_close(&embed(&base), &embed(&scaled));
        }
    }

    #[test]
    fn test_embedding_bounded_by_one() {
        // pose_size >= max distance from the hip center, so no normalized
        // point can be farther than 1 from the origin.
        let emb = embed(&standing_pose());
        let v = emb.as_slice();
        for i in 0..NUM_KEYPOINTS {
            let r = (v[2 * i].powi(2) + v[2 * i + 1].powi(2)).sqrt();
            assert!(r <= 1.0 + TOL);
        }
    }

    #[test]
    fn test_degenerate_pose_rejected() {
        let coincident = vec![[0.5f32, 0.5]; NUM_KEYPOINTS];
        let kps = KeypointSet::from_pairs(&coincident).unwrap();
        let result = normalize(&kps);
        assert!(matches!(
            result.unwrap_err(),
            ClassifyError::DegenerateInput(_)
        ));
    }

    #[test]
    fn test_from_vec_validates_length() {
        assert!(PoseEmbedding::from_vec(vec![0.0; 33]).is_err());
        assert!(PoseEmbedding::from_vec(vec![0.0; 35]).is_err());
        assert!(PoseEmbedding::from_vec(vec![0.0; 34]).is_ok());

        let mut bad = vec![0.0f32; 34];
        bad[7] = f32::NAN;
        assert!(PoseEmbedding::from_vec(bad).is_err());
    }
}
