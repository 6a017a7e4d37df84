// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

#![allow(clippy::multiple_crate_versions)]

//! # PoseFlow Inference Library
//!
//! Yoga pose classification from 2D keypoints, written in Rust: a
//! position/scale-invariant pose embedding plus ONNX Runtime inference
//! against a pre-trained pose classifier.
//!
//! ## Features
//!
//! - **Invariant embeddings** - 17 COCO keypoints are centered on the hip
//!   midpoint and divided by a torso-derived pose size, so the same pose
//!   near or far from the camera yields a comparable 34-float embedding
//! - **ONNX Runtime** - classifier inference through `ort` with graph
//!   optimizations and configurable intra-op threads
//! - **Single-flight loading** - a shared handle loads the model artifact
//!   once; concurrent first callers share the load, failures are retryable
//! - **Wire contract** - serde request/response types matching the
//!   `{ landmarks, threshold? }` → `{ top, scores, passed, threshold }`
//!   shape consumed by MCP tool handlers and HTTP routes
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use poseflow_inference::{ClassifierModel, KeypointSet, normalize};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load model - class names and embedding size come from its metadata
//!     let model = ClassifierModel::load("poseflow-classifier.onnx")?;
//!
//!     // 17 (x, y) keypoints from an upstream pose detector, in [0, 1]
//!     let landmarks = [[0.5f32, 0.5]; 17];
//!     let keypoints = KeypointSet::from_pairs(&landmarks)?;
//!
//!     let embedding = normalize(&keypoints)?;
//!     let result = model.classify(&embedding, 0.8)?;
//!
//!     println!("{} {:.2} (passed: {})", result.top.name, result.top.score, result.passed);
//!     for class in &result.scores {
//!         println!("  {} {:.3}", class.name, class.score);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Classify a landmark set (auto-downloads the default classifier)
//! poseflow-inference classify --input pose.json
//!
//! # Custom model and threshold
//! poseflow-inference classify -m classifier.onnx -i pose.json -t 0.95
//!
//! # Read the request from stdin
//! cat pose.json | poseflow-inference classify --input -
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoints`] | [`KeypointSet`] and COCO anatomical index constants |
//! | [`embedding`] | [`normalize`] and the [`PoseEmbedding`] type |
//! | [`classifier`] | [`ClassifierModel`] ONNX session wrapper |
//! | [`handle`] | [`SharedClassifier`] single-flight lazy loading |
//! | [`pipeline`] | [`ClassifyRequest`] and [`classify_landmarks`] |
//! | [`results`] | Output types ([`Classification`], [`ClassScore`]) |
//! | [`config`] | [`ClassifyConfig`] builder |
//! | [`metadata`] | ONNX model metadata parsing |
//! | [`download`] | Default artifact auto-download |
//! | [`error`] | Error types ([`ClassifyError`], [`Result`]) |
//!
//! The image→keypoints detector is deliberately not part of this crate:
//! upstream collaborators supply the landmark array, this crate supplies
//! the classification.

// Modules
pub mod classifier;
pub mod cli;
pub mod config;
pub mod download;
pub mod embedding;
pub mod error;
pub mod handle;
pub mod keypoints;
pub mod metadata;
pub mod pipeline;
pub mod results;

// Re-export main types for convenience
pub use classifier::ClassifierModel;
pub use config::{ClassifyConfig, DEFAULT_THRESHOLD};
pub use embedding::{EMBEDDING_LEN, PoseEmbedding, normalize};
pub use error::{ClassifyError, Result};
pub use handle::{SharedClassifier, SingleFlight};
pub use keypoints::{KeypointSet, NUM_KEYPOINTS};
pub use pipeline::{ClassifyRequest, classify_landmarks};
pub use results::{ClassScore, Classification};

// Re-export metadata for advanced use
pub use metadata::ModelMetadata;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
