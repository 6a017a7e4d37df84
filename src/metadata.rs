// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! ONNX model metadata parsing.
//!
//! Classifier artifacts carry their configuration as YAML in the ONNX
//! custom metadata properties: the class label set, the expected embedding
//! length, and export provenance. The label set is ordered — class id is
//! the enumeration index and the tie-break order for equal scores — so
//! names are kept as a `Vec`, not a map.

use std::collections::{BTreeMap, HashMap};

use crate::embedding::EMBEDDING_LEN;
use crate::error::{ClassifyError, Result};

/// The fixed yoga label set used when an artifact carries no names
/// (alphabetical, matching the shipped classifier's training order).
pub const DEFAULT_CLASS_NAMES: [&str; 7] = [
    "Chair",
    "Cobra",
    "Dog",
    "Shoulderstand",
    "Triangle",
    "Tree",
    "Warrior",
];

/// Metadata extracted from a pose classifier ONNX model.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model description (e.g. "PoseFlow yoga classifier trained on yoga82 subset").
    pub description: String,
    /// Model author.
    pub author: String,
    /// Export date.
    pub date: String,
    /// Exporter version.
    pub version: String,
    /// License information.
    pub license: String,
    /// Expected embedding length (34 for the 17-keypoint topology).
    pub embedding_len: usize,
    /// Class names in enumeration order; class id is the index.
    pub names: Vec<String>,
}

impl ModelMetadata {
    /// Parse metadata from ONNX model custom metadata properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is present but malformed.
    pub fn from_onnx_metadata(metadata_map: &HashMap<String, String>) -> Result<Self> {
        let yaml_str = metadata_map
            .get("metadata")
            .or_else(|| metadata_map.get("model_metadata"))
            .or_else(|| metadata_map.values().find(|v| v.contains("names:")))
            .ok_or_else(|| {
                ClassifyError::MetadataError(
                    "no metadata found in ONNX model properties".to_string(),
                )
            })?;

        Self::from_yaml_str(yaml_str)
    }

    /// Parse metadata from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed (non-numeric embedding
    /// length, non-contiguous class ids).
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        // Parse line-wise to avoid a YAML crate for this flat format.
        let mut metadata = Self::default();
        let mut ids: BTreeMap<usize, String> = BTreeMap::new();

        for line in yaml_str.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                let value = value.trim().trim_matches('\'').trim_matches('"');

                match key {
                    "description" => metadata.description = value.to_string(),
                    "author" => metadata.author = value.to_string(),
                    "date" => metadata.date = value.to_string(),
                    "version" => metadata.version = value.to_string(),
                    "license" => metadata.license = value.to_string(),
                    "embedding_len" => {
                        metadata.embedding_len = value.parse().map_err(|_| {
                            ClassifyError::MetadataError(format!(
                                "invalid embedding_len value: {value}"
                            ))
                        })?;
                    }
                    _ => {
                        // Class entries appear as numeric keys, either inline
                        // or inside a names block.
                        if let Ok(class_id) = key.parse::<usize>() {
                            ids.insert(class_id, value.to_string());
                        }
                    }
                }
            }
        }

        // Also accept the python-dict form `names: {0: 'Chair', 1: 'Cobra'}`.
        if ids.is_empty() {
            if let Some(start) = yaml_str.find("names:") {
                let after = yaml_str[start + 6..].trim_start();
                if let Some(rest) = after.strip_prefix('{') {
                    if let Some(end) = rest.find('}') {
                        ids = Self::parse_python_dict(&rest[..end])?;
                    }
                }
            }
        }

        if !ids.is_empty() {
            metadata.names = Self::ordered_names(ids)?;
        }

        Ok(metadata)
    }

    /// Parse a python dict body like `0: 'Chair', 1: 'Cobra'`.
    fn parse_python_dict(dict_str: &str) -> Result<BTreeMap<usize, String>> {
        let mut ids = BTreeMap::new();
        for entry in dict_str.split(',') {
            let entry = entry.trim();
            if let Some((key, value)) = entry.split_once(':') {
                let value = value.trim().trim_matches('\'').trim_matches('"');
                if let Ok(class_id) = key.trim().parse::<usize>() {
                    ids.insert(class_id, value.to_string());
                }
            }
        }
        Ok(ids)
    }

    /// Collapse an id→name map into the ordered name list, requiring the
    /// ids to be contiguous from zero.
    fn ordered_names(ids: BTreeMap<usize, String>) -> Result<Vec<String>> {
        let count = ids.len();
        let mut names = Vec::with_capacity(count);
        for (expected, (id, name)) in ids.into_iter().enumerate() {
            if id != expected {
                return Err(ClassifyError::MetadataError(format!(
                    "class ids must be contiguous from 0, missing id {expected}"
                )));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Get the number of classes in this model.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    /// Get a class name by id.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            author: "PoseFlow".to_string(),
            date: String::new(),
            version: String::new(),
            license: "AGPL-3.0".to_string(),
            embedding_len: EMBEDDING_LEN,
            names: DEFAULT_CLASS_NAMES.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_METADATA: &str = r"
description: PoseFlow yoga classifier
author: PoseFlow
date: '2025-11-02T10:41:02.113301'
version: 0.1.0
license: AGPL-3.0
embedding_len: 34
names:
  0: Chair
  1: Cobra
  2: Dog
  3: Shoulderstand
  4: Triangle
  5: Tree
  6: Warrior
";

    #[test]
    fn test_parse_metadata() {
        let metadata = ModelMetadata::from_yaml_str(SAMPLE_METADATA).unwrap();

        assert_eq!(metadata.embedding_len, 34);
        assert_eq!(metadata.num_classes(), 7);
        assert_eq!(metadata.class_name(0), Some("Chair"));
        assert_eq!(metadata.class_name(5), Some("Tree"));
        assert_eq!(metadata.class_name(7), None);
        assert_eq!(metadata.description, "PoseFlow yoga classifier");
    }

    #[test]
    fn test_parse_python_dict_names() {
        let yaml = "embedding_len: 34\nnames: {0: 'Tree', 1: 'Cobra'}";
        let metadata = ModelMetadata::from_yaml_str(yaml).unwrap();
        assert_eq!(metadata.names, vec!["Tree", "Cobra"]);
    }

    #[test]
    fn test_non_contiguous_ids_rejected() {
        let yaml = "names:\n  0: Tree\n  2: Cobra";
        let result = ModelMetadata::from_yaml_str(yaml);
        assert!(matches!(
            result.unwrap_err(),
            ClassifyError::MetadataError(_)
        ));
    }

    #[test]
    fn test_default_metadata() {
        let metadata = ModelMetadata::default();
        assert_eq!(metadata.embedding_len, 34);
        assert_eq!(metadata.num_classes(), 7);
        assert_eq!(metadata.class_name(5), Some("Tree"));
    }

    #[test]
    fn test_missing_names_keeps_default_set() {
        let yaml = "description: exported without names\nembedding_len: 34";
        let metadata = ModelMetadata::from_yaml_str(yaml).unwrap();
        assert_eq!(metadata.num_classes(), 7);
    }
}
