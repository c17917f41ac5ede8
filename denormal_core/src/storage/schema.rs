use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::types::datatype::DataType;

/// Represents a single column in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

fn default_primary_key() -> String {
    "id".to_string()
}

/// Represents the schema of a table: its columns and the integer
/// primary key column used for keyset pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
}

impl Schema {
    /// Creates a new schema keyed on the `id` column
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            primary_key: default_primary_key(),
        }
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Returns the number of columns in this schema
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn pk_index(&self) -> Option<usize> {
        self.column_index(&self.primary_key)
    }

    /// Checks column names are unique and the primary key is a
    /// non-nullable int column.
    pub fn validate(&self, table: &str) -> Result<(), StorageError> {
        let invalid = |reason: String| StorageError::InvalidSchema {
            table: table.to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column '{}'", column.name)));
            }
        }

        let pk = self
            .column(&self.primary_key)
            .ok_or_else(|| invalid(format!("primary key '{}' is not a column", self.primary_key)))?;
        if pk.dtype != DataType::Int || pk.nullable {
            return Err(invalid(format!(
                "primary key '{}' must be a non-nullable int",
                pk.name
            )));
        }
        Ok(())
    }
}
