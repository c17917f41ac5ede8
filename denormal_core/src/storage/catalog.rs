use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DenormalError, StorageError};
use crate::model::{Model, ModelRegistry};

/// Manages model definitions (metadata catalog)
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    models: Vec<Model>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    models: Vec<Model>,
}

impl Catalog {
    /// Creates a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a model exists in the catalog
    pub fn exists(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    /// Adds a model after validating it.
    /// Returns an error if the name is already taken.
    pub fn add_model(&mut self, model: Model) -> Result<(), DenormalError> {
        if self.exists(&model.name) {
            return Err(DenormalError::DuplicateModel(model.name));
        }
        model.validate()?;
        self.models.push(model);
        Ok(())
    }

    /// Models in registration order
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Saves catalog metadata to disk.
    pub fn save_to_path(&self, path: &Path) -> Result<(), StorageError> {
        let file = CatalogFile {
            models: self.models.clone(),
        };
        let payload =
            serde_json::to_string_pretty(&file).map_err(|e| StorageError::json(path, e))?;
        fs::write(path, payload).map_err(|e| StorageError::io(path, e))
    }

    /// Loads catalog metadata from disk.
    pub fn load_from_path(path: &Path) -> Result<Self, DenormalError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let file: CatalogFile =
            serde_json::from_str(&content).map_err(|e| StorageError::json(path, e))?;
        let mut catalog = Self::new();
        for model in file.models {
            catalog.add_model(model)?;
        }
        Ok(catalog)
    }
}

impl ModelRegistry for Catalog {
    fn get_model(&self, name: &str) -> Result<&Model, DenormalError> {
        self.models
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| DenormalError::ModelNotFound(name.to_string()))
    }
}
