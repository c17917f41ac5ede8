//! Models: named tables whose denormalized columns know how to recompute
//! themselves from other records.

pub mod derive;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::error::{DenormalError, StorageError};
use crate::storage::{Schema, StorageEngine};
use crate::types::value::Value;
use crate::types::Record;

pub use derive::Derivation;
pub use registry::ModelRegistry;

/// A denormalized column and the rule that produces its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedField {
    pub column: String,
    #[serde(flatten)]
    pub derivation: Derivation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Dotted name such as `shop.Order`; also the storage table name
    pub name: String,
    pub schema: Schema,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
}

impl Model {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            derived: Vec::new(),
        }
    }

    pub fn with_derived(mut self, column: impl Into<String>, derivation: Derivation) -> Self {
        self.derived.push(DerivedField {
            column: column.into(),
            derivation,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn derivation(&self, column: &str) -> Option<&Derivation> {
        self.derived
            .iter()
            .find(|d| d.column == column)
            .map(|d| &d.derivation)
    }

    /// Value of `column` in a record of this model
    pub fn value<'r>(&self, record: &'r Record, column: &str) -> Option<&'r Value> {
        self.schema
            .column_index(column)
            .and_then(|idx| record.values.get(idx))
    }

    pub fn validate(&self) -> Result<(), DenormalError> {
        let invalid = |reason: String| DenormalError::InvalidModel {
            model: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        // The name doubles as the table file name
        if self.name.contains(['/', '\\']) || self.name.contains("..") {
            return Err(invalid(
                "name must not contain path separators or '..'".to_string(),
            ));
        }
        self.schema.validate(&self.name)?;
        for (i, field) in self.derived.iter().enumerate() {
            if self.schema.column(&field.column).is_none() {
                return Err(invalid(format!(
                    "derived field '{}' is not a column",
                    field.column
                )));
            }
            if field.column == self.schema.primary_key {
                return Err(invalid("the primary key cannot be derived".to_string()));
            }
            if self.derived[..i].iter().any(|d| d.column == field.column) {
                return Err(invalid(format!(
                    "derived field '{}' is declared twice",
                    field.column
                )));
            }
        }
        Ok(())
    }

    /// Partial save: writes exactly `fields` of `record` back to storage.
    ///
    /// Derived columns are recomputed, plain columns are written back as
    /// they are. Column names are not checked here; storage rejects the
    /// write if one does not exist.
    pub fn save_fields(
        &self,
        storage: &dyn StorageEngine,
        record: &Record,
        fields: &[String],
    ) -> Result<(), StorageError> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let value = match self.derivation(field) {
                Some(derivation) => derivation.compute(self, record, storage)?,
                None => self.value(record, field).cloned().unwrap_or(Value::Null),
            };
            values.push((field.clone(), value));
        }
        storage.update_columns(&self.name, record.pk, &values)
    }
}
