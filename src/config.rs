// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Classification configuration.
//!
//! This module defines the [`ClassifyConfig`] struct, which controls the
//! acceptance threshold and ONNX Runtime execution options. It uses a
//! builder pattern for convenient construction.

use crate::error::{ClassifyError, Result};

/// Default acceptance threshold applied when a request supplies none.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Configuration for pose classification.
///
/// # Example
///
/// ```rust
/// use poseflow_inference::ClassifyConfig;
///
/// let config = ClassifyConfig::new()
///     .with_threshold(0.9)
///     .with_threads(4);
/// ```
#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    /// Minimum top-class confidence for a classification to be considered
    /// "passed" (0.0 to 1.0). Per-request thresholds override this.
    pub threshold: f32,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
    /// Whether to run a warmup pass (zero embedding) after loading the
    /// model, pre-allocating session memory before the first real request.
    pub warmup: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            num_threads: 0, // 0 = let ONNX Runtime decide
            warmup: true,
        }
    }
}

impl ClassifyConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default acceptance threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum top-class confidence (0.0 to 1.0).
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the number of intra-op threads for inference.
    ///
    /// # Arguments
    ///
    /// * `threads` - The thread count. Set to `0` for auto-configuration.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Enable or disable the warmup pass after model load.
    #[must_use]
    pub const fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ConfigError`] if the threshold is outside
    /// `[0, 1]`. Out-of-range thresholds are rejected, not clamped.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)
    }
}

/// Check that a threshold lies in `[0, 1]`.
///
/// # Errors
///
/// Returns [`ClassifyError::ConfigError`] otherwise.
pub fn validate_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ClassifyError::ConfigError(format!(
            "threshold must be in [0, 1], got {threshold}"
        )));
    }
    Ok(())
}
