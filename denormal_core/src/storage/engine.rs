use crate::error::StorageError;
use crate::storage::Schema;
use crate::types::value::Value;
use crate::types::{Record, Row};

/// Storage engine trait - abstraction for different storage backends
/// (in-memory, disk-based, etc.)
///
/// Handles behave like a database connection: every operation takes
/// `&self`, so a cursor can keep reading a table while rows are written
/// back through the same handle.
pub trait StorageEngine {
    /// Creates a table in the storage (allocates space for rows)
    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError>;

    /// Returns a copy of the table's schema
    fn schema(&self, table: &str) -> Result<Schema, StorageError>;

    /// Inserts a row and returns its primary key
    fn insert(&self, table: &str, row: Row) -> Result<i64, StorageError>;

    /// Number of rows in the table
    fn count(&self, table: &str) -> Result<usize, StorageError>;

    /// Largest primary key present, `None` for an empty table
    fn max_pk(&self, table: &str) -> Result<Option<i64>, StorageError>;

    /// Up to `limit` rows with a primary key strictly greater than `after`,
    /// in ascending key order
    fn fetch_after(
        &self,
        table: &str,
        after: i64,
        limit: usize,
    ) -> Result<Vec<Record>, StorageError>;

    /// Looks up a single row by primary key
    fn get(&self, table: &str, pk: i64) -> Result<Option<Record>, StorageError>;

    /// All rows whose `column` equals `value`, in ascending key order
    fn find_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StorageError>;

    /// Number of rows whose `column` equals `value`
    fn count_by(&self, table: &str, column: &str, value: &Value) -> Result<usize, StorageError> {
        Ok(self.find_by(table, column, value)?.len())
    }

    /// Partial write: updates only the named columns of one row. Either
    /// every value is applied or none is.
    fn update_columns(
        &self,
        table: &str,
        pk: i64,
        values: &[(String, Value)],
    ) -> Result<(), StorageError>;

    /// Starts a flat transaction. Nested transactions are rejected.
    fn begin(&self) -> Result<(), StorageError>;

    fn commit(&self) -> Result<(), StorageError>;

    fn rollback(&self) -> Result<(), StorageError>;
}
