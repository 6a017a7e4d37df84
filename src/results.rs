// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Classification result types.
//!
//! [`Classification`] is the atomic output of the pipeline: the top-scoring
//! class, the full score map in descending order, the threshold that was
//! applied, and the resulting `passed` flag. Results are built from a raw
//! per-class score vector by [`Classification::from_scores`], which is
//! pure and independent of the model backend.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ClassifyError, Result};

/// A single `(class name, confidence)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    /// Pose class name (e.g. "Tree").
    pub name: String,
    /// Confidence score in `[0, 1]`.
    pub score: f32,
}

/// The result of classifying one pose embedding.
///
/// Serializes to the wire contract:
/// `{ top: { name, score }, scores: { class: score, ... }, passed, threshold }`
/// with `scores` emitted as a JSON map in descending score order.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// The top-scoring class.
    pub top: ClassScore,
    /// All classes with their scores, sorted descending. Ties keep the
    /// model's class enumeration order.
    #[serde(serialize_with = "scores_as_map")]
    pub scores: Vec<ClassScore>,
    /// Whether `top.score >= threshold`.
    pub passed: bool,
    /// The threshold that was applied.
    pub threshold: f32,
}

impl Classification {
    /// Build a classification result from raw per-class scores.
    ///
    /// `names` and `scores` are parallel, indexed by class id. Sorting is
    /// stable, so equal scores keep the enumeration order.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InferenceError`] if the two slices differ
    /// in length, the class set is empty, or a score is non-finite.
    pub fn from_scores(names: &[String], scores: &[f32], threshold: f32) -> Result<Self> {
        if names.len() != scores.len() {
            return Err(ClassifyError::InferenceError(format!(
                "classifier produced {} scores for {} classes",
                scores.len(),
                names.len()
            )));
        }
        if names.is_empty() {
            return Err(ClassifyError::InferenceError(
                "classifier has no classes".to_string(),
            ));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
            return Err(ClassifyError::InferenceError(format!(
                "classifier produced non-finite score {bad}"
            )));
        }

        let mut entries: Vec<ClassScore> = names
            .iter()
            .zip(scores)
            .map(|(name, &score)| ClassScore {
                name: name.clone(),
                score,
            })
            .collect();

        // Vec::sort_by is stable; ties keep class enumeration order.
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top = entries[0].clone();
        let passed = top.score >= threshold;

        Ok(Self {
            top,
            scores: entries,
            passed,
            threshold,
        })
    }

    /// Look up the score for a class by name.
    #[must_use]
    pub fn score_of(&self, name: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.score)
    }

    /// Generate a log string like `"Tree 0.93, Cobra 0.02, Dog 0.01, "`.
    #[must_use]
    pub fn verbose(&self) -> String {
        let parts: Vec<String> = self
            .scores
            .iter()
            .take(3)
            .map(|c| format!("{} {:.2}", c.name, c.score))
            .collect();
        format!("{}, ", parts.join(", "))
    }
}

/// Serialize the sorted score list as an order-preserving JSON map.
fn scores_as_map<S>(scores: &[ClassScore], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(scores.len()))?;
    for entry in scores {
        map.serialize_entry(&entry.name, &entry.score)?;
    }
    map.end()
}
