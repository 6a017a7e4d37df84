// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Error types for the pose classification library.

use std::fmt;

/// Result type alias for classification operations.
pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Main error type for the pose classification library.
#[derive(Debug)]
pub enum ClassifyError {
    /// Caller-supplied input is malformed (wrong keypoint count, non-finite
    /// coordinates, wrong embedding length).
    InvalidInput(String),
    /// Pose geometry collapses to a point, so no normalization scale exists.
    DegenerateInput(String),
    /// The classifier artifact could not be loaded. May be transient
    /// (network fetch); callers can retry after backoff.
    ModelLoadError(String),
    /// Error while running the classifier session.
    InferenceError(String),
    /// Invalid configuration provided (e.g. threshold outside [0, 1]).
    ConfigError(String),
    /// Error parsing model metadata.
    MetadataError(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::DegenerateInput(msg) => write!(f, "Degenerate input: {msg}"),
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::MetadataError(msg) => write!(f, "Metadata error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClassifyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClassifyError::InvalidInput("expected 17 keypoints".to_string());
        assert_eq!(err.to_string(), "Invalid input: expected 17 keypoints");

        let err = ClassifyError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = ClassifyError::DegenerateInput("zero pose size".to_string());
        assert_eq!(err.to_string(), "Degenerate input: zero pose size");
    }

    #[test]
    fn test_io_error_source() {
        let err: ClassifyError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
