// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Shared, lazily loaded classifier handle.
//!
//! Model loading is a one-time memoized operation with single-flight
//! semantics: the first caller triggers the load, concurrent callers block
//! on the same in-flight load instead of racing to load the artifact
//! twice, and a failed load leaves the slot empty so a later caller can
//! retry (artifact fetch failures may be transient). The handle is an
//! explicitly owned value to be constructed once and passed where needed,
//! not a process-global.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::classifier::ClassifierModel;
use crate::config::ClassifyConfig;
use crate::embedding::PoseEmbedding;
use crate::error::{ClassifyError, Result};
use crate::results::Classification;

/// A memoized load cell with single-flight semantics.
///
/// The mutex is held for the duration of the loader call, so concurrent
/// first callers queue behind one load and then all share the same `Arc`.
/// Unlike `OnceLock`, a failed load is not cached.
#[derive(Debug)]
pub struct SingleFlight<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> SingleFlight<T> {
    /// Create an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Get the value if already loaded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Get the value, running `init` to produce it if the cell is empty.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error; the cell stays empty in that case.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ClassifyError::InferenceError("load cell lock poisoned".to_string()))?;

        if let Some(value) = &*slot {
            return Ok(value.clone());
        }

        let value = Arc::new(init()?);
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A shared classifier handle that loads the model artifact on first use.
///
/// # Example
///
/// ```no_run
/// use poseflow_inference::{ClassifyConfig, SharedClassifier};
///
/// let classifier = SharedClassifier::new("poseflow-classifier.onnx", ClassifyConfig::default());
/// // First call loads the model; later calls reuse it.
/// let model = classifier.get()?;
/// assert_eq!(model.num_classes(), 7);
/// # Ok::<(), poseflow_inference::ClassifyError>(())
/// ```
#[derive(Debug)]
pub struct SharedClassifier {
    path: PathBuf,
    config: ClassifyConfig,
    cell: SingleFlight<ClassifierModel>,
}

impl SharedClassifier {
    /// Create a handle for the artifact at `path`. Does not load anything.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P, config: ClassifyConfig) -> Self {
        Self {
            path: path.into(),
            config,
            cell: SingleFlight::new(),
        }
    }

    /// The artifact path this handle loads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the model has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the loaded model, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ModelLoadError`] if the artifact can't be
    /// loaded. The handle stays unloaded, so the call can be retried.
    pub fn get(&self) -> Result<Arc<ClassifierModel>> {
        self.cell
            .get_or_try_init(|| ClassifierModel::load_with_config(&self.path, &self.config))
    }

    /// Classify an embedding with this handle's default threshold,
    /// loading the model if needed.
    ///
    /// # Errors
    ///
    /// Propagates load and classification errors.
    pub fn classify(&self, embedding: &PoseEmbedding) -> Result<Classification> {
        self.get()?.classify(embedding, self.config.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_loader_runs_once() {
        let cell: SingleFlight<u32> = SingleFlight::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let value = cell
                .get_or_try_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retryable() {
        let cell: SingleFlight<u32> = SingleFlight::new();

        let result = cell.get_or_try_init(|| {
            Err(ClassifyError::ModelLoadError("transient".to_string()))
        });
        assert!(result.is_err());
        assert!(cell.get().is_none());

        let value = cell.get_or_try_init(|| Ok(7)).unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let cell: Arc<SingleFlight<u32>> = Arc::new(SingleFlight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                let calls = calls.clone();
                std::thread::spawn(move || {
                    let value = cell
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Widen the race window.
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            Ok(99)
                        })
                        .unwrap();
                    *value
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 99);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_classifier_missing_artifact() {
        let classifier =
            SharedClassifier::new("nonexistent.onnx", ClassifyConfig::default());
        assert!(!classifier.is_loaded());
        assert!(classifier.get().is_err());
        // Failure is not cached.
        assert!(!classifier.is_loaded());
    }
}
