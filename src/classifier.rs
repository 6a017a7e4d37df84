// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Classifier model loading and inference.
//!
//! This module provides the [`ClassifierModel`] struct for loading the
//! pose classifier ONNX artifact and scoring embeddings against it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array2, Axis};
use ort::session::Session;
use ort::value::TensorRef;

use crate::config::{ClassifyConfig, validate_threshold};
use crate::embedding::PoseEmbedding;
use crate::error::{ClassifyError, Result};
use crate::metadata::ModelMetadata;
use crate::results::Classification;

/// Pose classifier backed by an ONNX Runtime session.
///
/// Once loaded the model is read-only: [`classify`](Self::classify) takes
/// `&self`, so a handle can be shared behind an `Arc` across threads. The
/// session itself is guarded by a mutex because ONNX Runtime runs take a
/// mutable session reference.
///
/// # Example
///
/// ```no_run
/// use poseflow_inference::{ClassifierModel, KeypointSet, normalize};
///
/// let model = ClassifierModel::load("poseflow-classifier.onnx")?;
/// let keypoints = KeypointSet::from_pairs(&[[0.5, 0.5]; 17])?;
/// let embedding = normalize(&keypoints)?;
/// let result = model.classify(&embedding, 0.8)?;
/// println!("{} {:.2}", result.top.name, result.top.score);
/// # Ok::<(), poseflow_inference::ClassifyError>(())
/// ```
pub struct ClassifierModel {
    /// ONNX Runtime session.
    session: Mutex<Session>,
    /// Model metadata (classes, embedding length, provenance).
    metadata: ModelMetadata,
    /// Input tensor name.
    input_name: String,
    /// Output tensor name.
    output_name: String,
}

impl ClassifierModel {
    /// Load a classifier from an ONNX file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ModelLoadError`] if the file doesn't exist
    /// or the session can't be created.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, &ClassifyConfig::default())
    }

    /// Load a classifier with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ConfigError`] for an invalid configuration
    /// and [`ClassifyError::ModelLoadError`] if loading fails.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: &ClassifyConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();

        if !path.exists() {
            return Err(ClassifyError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                ClassifyError::ModelLoadError(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| {
                ClassifyError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                ClassifyError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| ClassifyError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let metadata = Self::extract_metadata(&session)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "embedding".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "scores".to_string());

        let model = Self {
            session: Mutex::new(session),
            metadata,
            input_name,
            output_name,
        };

        if config.warmup {
            model.warmup()?;
        }

        Ok(model)
    }

    /// Run a zero embedding through the session to pre-allocate memory
    /// before the first real request.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InferenceError`] if the warmup run fails.
    pub fn warmup(&self) -> Result<()> {
        let dummy = Array2::<f32>::zeros((1, self.metadata.embedding_len));
        let _ = self.run_session(&dummy)?;
        Ok(())
    }

    /// Extract metadata from the ONNX model session.
    fn extract_metadata(session: &Session) -> Result<ModelMetadata> {
        let model_metadata = session.metadata().map_err(|e| {
            ClassifyError::ModelLoadError(format!("Failed to get model metadata: {e}"))
        })?;

        // Exporters store metadata under individual keys; rebuild the
        // combined YAML string from whichever are present.
        let keys = [
            "description",
            "author",
            "date",
            "version",
            "license",
            "embedding_len",
            "names",
        ];

        let mut metadata_map: HashMap<String, String> = HashMap::new();
        for key in &keys {
            if let Ok(Some(value)) = model_metadata.custom(key) {
                metadata_map.insert((*key).to_string(), value);
            }
        }

        if metadata_map.is_empty() {
            // Artifact without metadata: fall back to the fixed label set.
            return Ok(ModelMetadata::default());
        }

        let mut yaml_parts = Vec::new();
        for (key, value) in &metadata_map {
            yaml_parts.push(format!("{key}: {value}"));
        }
        ModelMetadata::from_yaml_str(&yaml_parts.join("\n"))
    }

    /// Classify a pose embedding.
    ///
    /// Produces one confidence score per known class, sorted descending
    /// (ties keep the class enumeration order), with
    /// `passed = top.score >= threshold`.
    ///
    /// # Errors
    ///
    /// * [`ClassifyError::ConfigError`] - threshold outside `[0, 1]`.
    /// * [`ClassifyError::InvalidInput`] - embedding length doesn't match
    ///   the model's expected input.
    /// * [`ClassifyError::InferenceError`] - session run failed or the
    ///   model produced a malformed score vector.
    pub fn classify(&self, embedding: &PoseEmbedding, threshold: f32) -> Result<Classification> {
        validate_threshold(threshold)?;

        if embedding.len() != self.metadata.embedding_len {
            return Err(ClassifyError::InvalidInput(format!(
                "expected embedding of {} elements, got {}",
                self.metadata.embedding_len,
                embedding.len()
            )));
        }

        let input = embedding.as_array().clone().insert_axis(Axis(0));
        let scores = self.run_session(&input)?;

        Classification::from_scores(&self.metadata.names, &scores, threshold)
    }

    /// Run the ONNX session on a `(1, embedding_len)` input.
    fn run_session(&self, input: &Array2<f32>) -> Result<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::InferenceError("session lock poisoned".to_string()))?;

        // Ensure input is contiguous in memory (CowArray).
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            ClassifyError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = session
            .run(inputs)
            .map_err(|e| ClassifyError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ClassifyError::InferenceError(format!("Output '{}' not found", self.output_name))
        })?;

        let (_, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            ClassifyError::InferenceError(format!("Failed to extract output: {e}"))
        })?;

        Ok(data.to_vec())
    }

    /// Get the model's class names in enumeration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.metadata.names
    }

    /// Get the number of classes.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.metadata.num_classes()
    }

    /// Get the model's expected embedding length.
    #[must_use]
    pub const fn embedding_len(&self) -> usize {
        self.metadata.embedding_len
    }

    /// Get the model metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for ClassifierModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierModel")
            .field("num_classes", &self.metadata.num_classes())
            .field("embedding_len", &self.metadata.embedding_len)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish()
    }
}
