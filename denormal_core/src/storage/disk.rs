use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::StorageError;
use crate::storage::engine::StorageEngine;
use crate::storage::mem::MemStorage;
use crate::storage::Schema;
use crate::types::value::{value_from_json, value_to_json, Value};
use crate::types::{Record, Row};

/// Directory-backed storage.
///
/// Rows live in memory while the process runs. Each table is stored as
/// `tables/<table>.rows`, one JSON array per row in schema column order.
/// Writes made outside a transaction are flushed immediately; inside a
/// transaction the touched tables are rewritten on commit.
#[derive(Debug)]
pub struct DiskStorage {
    root: PathBuf,
    inner: MemStorage,
}

impl DiskStorage {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        initialize_layout(&root)?;
        Ok(Self {
            root,
            inner: MemStorage::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_file_path(&self, table: &str) -> PathBuf {
        self.root.join("tables").join(format!("{table}.rows"))
    }

    /// Loads a table's rows from disk, creating an empty file for a new table.
    pub fn bootstrap_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError> {
        let table_file = self.table_file_path(table);
        if !table_file.exists() {
            File::create(&table_file).map_err(|e| StorageError::io(&table_file, e))?;
        }

        let content =
            fs::read_to_string(&table_file).map_err(|e| StorageError::io(&table_file, e))?;
        let mut rows: Vec<Row> = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(decode_row(table, schema, line_no + 1, line)?);
        }

        debug!(table, rows = rows.len(), "bootstrapped table");
        self.inner.load_table(table, schema, rows)
    }

    /// Rewrites one table file from memory.
    pub fn persist_table(&self, table: &str) -> Result<(), StorageError> {
        self.persist_tables(&[table.to_string()])
    }

    /// Writes every table to a temporary file first and only then renames
    /// them into place, so a failed encode or write leaves all files intact.
    fn persist_tables(&self, tables: &[String]) -> Result<(), StorageError> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(tables.len());
        for table in tables {
            let rows = self.inner.rows(table)?;
            let mut payload = String::new();
            for row in &rows {
                let encoded: Vec<JsonValue> = row.iter().map(value_to_json).collect();
                let line = serde_json::to_string(&encoded)
                    .map_err(|e| StorageError::json(self.table_file_path(table), e))?;
                payload.push_str(&line);
                payload.push('\n');
            }
            let target = self.table_file_path(table);
            let tmp = target.with_extension("rows.tmp");
            fs::write(&tmp, payload).map_err(|e| StorageError::io(&tmp, e))?;
            staged.push((tmp, target));
        }
        for (tmp, target) in staged {
            fs::rename(&tmp, &target).map_err(|e| StorageError::io(&target, e))?;
        }
        Ok(())
    }

    fn flush_if_autocommit(&self, table: &str) -> Result<(), StorageError> {
        if self.inner.in_transaction() {
            return Ok(());
        }
        self.persist_table(table)?;
        self.inner.clear_dirty();
        Ok(())
    }
}

fn initialize_layout(root: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(root).map_err(|e| StorageError::io(root, e))?;
    let tables = root.join("tables");
    fs::create_dir_all(&tables).map_err(|e| StorageError::io(&tables, e))
}

fn decode_row(table: &str, schema: &Schema, line: usize, text: &str) -> Result<Row, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        table: table.to_string(),
        line,
        reason,
    };
    let tokens: Vec<JsonValue> =
        serde_json::from_str(text).map_err(|e| corrupt(format!("invalid JSON: {e}")))?;
    if tokens.len() != schema.column_count() {
        return Err(corrupt(format!(
            "expected {} values, got {}",
            schema.column_count(),
            tokens.len()
        )));
    }
    schema
        .columns
        .iter()
        .zip(&tokens)
        .map(|(column, token)| value_from_json(&column.dtype, token).map_err(corrupt))
        .collect()
}

impl StorageEngine for DiskStorage {
    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError> {
        self.inner.create_table(table, schema)?;
        self.persist_table(table)
    }

    fn schema(&self, table: &str) -> Result<Schema, StorageError> {
        self.inner.schema(table)
    }

    fn insert(&self, table: &str, row: Row) -> Result<i64, StorageError> {
        let pk = self.inner.insert(table, row)?;
        self.flush_if_autocommit(table)?;
        Ok(pk)
    }

    fn count(&self, table: &str) -> Result<usize, StorageError> {
        self.inner.count(table)
    }

    fn max_pk(&self, table: &str) -> Result<Option<i64>, StorageError> {
        self.inner.max_pk(table)
    }

    fn fetch_after(
        &self,
        table: &str,
        after: i64,
        limit: usize,
    ) -> Result<Vec<Record>, StorageError> {
        self.inner.fetch_after(table, after, limit)
    }

    fn get(&self, table: &str, pk: i64) -> Result<Option<Record>, StorageError> {
        self.inner.get(table, pk)
    }

    fn find_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StorageError> {
        self.inner.find_by(table, column, value)
    }

    fn count_by(&self, table: &str, column: &str, value: &Value) -> Result<usize, StorageError> {
        self.inner.count_by(table, column, value)
    }

    fn update_columns(
        &self,
        table: &str,
        pk: i64,
        values: &[(String, Value)],
    ) -> Result<(), StorageError> {
        self.inner.update_columns(table, pk, values)?;
        self.flush_if_autocommit(table)
    }

    fn begin(&self) -> Result<(), StorageError> {
        self.inner.begin()
    }

    fn commit(&self) -> Result<(), StorageError> {
        if !self.inner.in_transaction() {
            return Err(StorageError::NoTransaction);
        }
        let dirty = self.inner.dirty_tables();
        self.persist_tables(&dirty)?;
        self.inner.commit()?;
        self.inner.clear_dirty();
        debug!(tables = dirty.len(), "committed to disk");
        Ok(())
    }

    fn rollback(&self) -> Result<(), StorageError> {
        self.inner.rollback()
    }
}
