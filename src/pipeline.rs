// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! End-to-end request handling.
//!
//! This is the contract an upstream collaborator (HTTP route, MCP tool
//! handler) invokes: a [`ClassifyRequest`] of 17 landmarks plus an
//! optional threshold in, a [`Classification`] out. Producing the
//! landmarks from an image is the upstream detector's job; this crate
//! starts where the detector ends.
//!
//! Everything here is created per request and dropped with the response.
//! Classification either fully succeeds or fails with one of the crate
//! error kinds; no partial results.

use serde::Deserialize;

use crate::classifier::ClassifierModel;
use crate::config::{DEFAULT_THRESHOLD, validate_threshold};
use crate::embedding::normalize;
use crate::error::Result;
use crate::keypoints::KeypointSet;
use crate::results::Classification;

/// A pose classification request.
///
/// Wire shape: `{ "landmarks": [[x, y]; 17], "threshold": 0.9 }` with
/// `threshold` optional (defaults to 0.8).
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    /// 17 `(x, y)` keypoints in COCO order, image-normalized to `[0, 1]`.
    pub landmarks: Vec<[f32; 2]>,
    /// Acceptance threshold override in `[0, 1]`.
    #[serde(default)]
    pub threshold: Option<f32>,
}

impl ClassifyRequest {
    /// Build a request from landmarks with the default threshold.
    #[must_use]
    pub fn new(landmarks: Vec<[f32; 2]>) -> Self {
        Self {
            landmarks,
            threshold: None,
        }
    }

    /// The threshold to apply: the request's, or 0.8 when absent.
    #[must_use]
    pub fn resolved_threshold(&self) -> f32 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    /// Validate the landmark array into a [`KeypointSet`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClassifyError::InvalidInput`] for a wrong point
    /// count or non-finite coordinates.
    pub fn keypoints(&self) -> Result<KeypointSet> {
        KeypointSet::from_pairs(&self.landmarks)
    }
}

/// Run the full landmarks → embedding → classification pipeline.
///
/// # Errors
///
/// * `ConfigError` - threshold outside `[0, 1]`.
/// * `InvalidInput` - malformed landmark array.
/// * `DegenerateInput` - all keypoints coincident.
/// * `InferenceError` - session failure.
pub fn classify_landmarks(
    model: &ClassifierModel,
    request: &ClassifyRequest,
) -> Result<Classification> {
    let threshold = request.resolved_threshold();
    validate_threshold(threshold)?;

    let keypoints = request.keypoints()?;
    let embedding = normalize(&keypoints)?;
    model.classify(&embedding, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;

    #[test]
    fn test_request_deserializes_with_default_threshold() {
        let json = format!(
            r#"{{"landmarks": {}}}"#,
            serde_json::to_string(&vec![[0.5f32, 0.5]; 17]).unwrap()
        );
        let request: ClassifyRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(request.landmarks.len(), 17);
        assert!(request.threshold.is_none());
        assert!((request.resolved_threshold() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_request_threshold_override() {
        let json = format!(
            r#"{{"landmarks": {}, "threshold": 0.95}}"#,
            serde_json::to_string(&vec![[0.5f32, 0.5]; 17]).unwrap()
        );
        let request: ClassifyRequest = serde_json::from_str(&json).unwrap();
        assert!((request.resolved_threshold() - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wrong_landmark_count_rejected() {
        let request = ClassifyRequest::new(vec![[0.5, 0.5]; 16]);
        assert!(matches!(
            request.keypoints().unwrap_err(),
            ClassifyError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_missing_landmarks_field_rejected() {
        let result: std::result::Result<ClassifyRequest, _> =
            serde_json::from_str(r#"{"threshold": 0.9}"#);
        assert!(result.is_err());
    }
}
