// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! CLI module for running classification.
//!
//! This module contains the command-line interface logic, including
//! argument parsing and the `classify` command implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Classification logic.
pub mod classify;

/// Logging helpers.
pub mod logging;
