use std::path::Path;
use std::sync::Arc;

use crate::error::StartupError;

/// Ordered class names, index-aligned with the classifier's output vector.
///
/// Loaded once at startup and read-only afterwards; clones share the same
/// backing slice.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCatalog {
    labels: Arc<[String]>,
}

impl LabelCatalog {
    /// Reads a JSON array of strings (e.g. `class_names.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<LabelCatalog, StartupError> {
        let path = path.as_ref();
        let fail = |reason: String| StartupError::CatalogLoad { path: path.to_path_buf(), reason };

        let raw = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
        let labels: Vec<String> = serde_json::from_slice(&raw).map_err(|e| fail(e.to_string()))?;
        LabelCatalog::from_labels(labels).map_err(fail)
    }

    pub fn from_labels(labels: Vec<String>) -> Result<LabelCatalog, String> {
        if labels.is_empty() {
            return Err("class name list is empty".to_owned());
        }
        Ok(LabelCatalog { labels: labels.into() })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}
