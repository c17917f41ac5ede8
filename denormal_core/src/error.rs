use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the storage layer. Write rejections surface through
/// this type unmodified.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table '{0}' does not exist in storage")]
    UnknownTable(String),

    #[error("table '{0}' already exists in storage")]
    TableExists(String),

    #[error("column '{column}' does not exist on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("type mismatch for '{table}.{column}': expected {expected}, got {found}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        found: String,
    },

    #[error("column '{table}.{column}' is not nullable")]
    NotNullable { table: String, column: String },

    #[error("row with primary key {pk} not found in table '{table}'")]
    RowNotFound { table: String, pk: i64 },

    #[error("duplicate primary key {pk} in table '{table}'")]
    DuplicateKey { table: String, pk: i64 },

    #[error("primary key of table '{table}' must be a positive int, got {found}")]
    InvalidPrimaryKey { table: String, found: String },

    #[error("primary key column '{table}.{column}' cannot be changed")]
    PrimaryKeyUpdate { table: String, column: String },

    #[error("row for table '{table}' has {found} values, expected {expected}")]
    Arity {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid schema for table '{table}': {reason}")]
    InvalidSchema { table: String, reason: String },

    #[error("integer overflow computing '{table}.{column}'")]
    Overflow { table: String, column: String },

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("no active transaction")]
    NoTransaction,

    #[error("malformed row in table '{table}' at line {line}: {reason}")]
    Corrupt {
        table: String,
        line: usize,
        reason: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while refreshing denormalized fields.
#[derive(Debug, Error)]
pub enum DenormalError {
    #[error("malformed target '{0}': expected `table.column`")]
    MalformedTarget(String),

    #[error("model '{0}' not found")]
    ModelNotFound(String),

    #[error("model '{0}' is already registered")]
    DuplicateModel(String),

    #[error("invalid model '{model}': {reason}")]
    InvalidModel { model: String, reason: String },

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = DenormalError> = std::result::Result<T, E>;
