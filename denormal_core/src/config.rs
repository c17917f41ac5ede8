use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::refresh::DEFAULT_CHUNK_SIZE;

/// Per-database settings, read from `settings.json` next to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Rows fetched per cursor query.
    pub chunk_size: usize,
    /// Whether callers that can render progress should do so.
    pub progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: true,
        }
    }
}

impl Settings {
    /// Loads settings from disk. A missing or blank file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::json(path, e))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string_pretty(self).map_err(|e| StorageError::json(path, e))?;
        fs::write(path, payload).map_err(|e| StorageError::io(path, e))
    }
}
