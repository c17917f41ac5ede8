use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::Model;
use crate::storage::StorageEngine;
use crate::types::datatype::DataType;
use crate::types::value::Value;
use crate::types::Record;

/// How a denormalized column is computed from related records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// Number of `source` rows whose `foreign_key` points at this record
    Count { source: String, foreign_key: String },
    /// Sum of `source_column` over the `source` rows pointing at this record
    Sum {
        source: String,
        foreign_key: String,
        source_column: String,
    },
    /// Copy of `target.target_column` from the row this record's
    /// `foreign_key` points at
    Related {
        foreign_key: String,
        target: String,
        target_column: String,
    },
}

impl Derivation {
    pub fn compute(
        &self,
        model: &Model,
        record: &Record,
        storage: &dyn StorageEngine,
    ) -> Result<Value, StorageError> {
        match self {
            Derivation::Count {
                source,
                foreign_key,
            } => {
                let count = storage.count_by(source, foreign_key, &Value::Int(record.pk))?;
                Ok(Value::Int(count as i64))
            }
            Derivation::Sum {
                source,
                foreign_key,
                source_column: column,
            } => {
                let schema = storage.schema(source)?;
                let idx = schema
                    .column_index(column)
                    .ok_or_else(|| StorageError::UnknownColumn {
                        table: source.clone(),
                        column: column.clone(),
                    })?;
                let rows = storage.find_by(source, foreign_key, &Value::Int(record.pk))?;
                sum_column(source, column, schema.columns[idx].dtype, &rows, idx)
            }
            Derivation::Related {
                foreign_key,
                target,
                target_column: column,
            } => {
                let key = model
                    .value(record, foreign_key)
                    .ok_or_else(|| StorageError::UnknownColumn {
                        table: model.name.clone(),
                        column: foreign_key.clone(),
                    })?;
                let pk = match key {
                    Value::Null => return Ok(Value::Null),
                    Value::Int(pk) => *pk,
                    other => {
                        return Err(StorageError::TypeMismatch {
                            table: model.name.clone(),
                            column: foreign_key.clone(),
                            expected: DataType::Int.to_string(),
                            found: other.type_name().to_string(),
                        });
                    }
                };
                let schema = storage.schema(target)?;
                let idx = schema
                    .column_index(column)
                    .ok_or_else(|| StorageError::UnknownColumn {
                        table: target.clone(),
                        column: column.clone(),
                    })?;
                Ok(storage
                    .get(target, pk)?
                    .map(|related| related.values[idx].clone())
                    .unwrap_or(Value::Null))
            }
        }
    }
}

fn sum_column(
    table: &str,
    column: &str,
    dtype: DataType,
    rows: &[Record],
    idx: usize,
) -> Result<Value, StorageError> {
    let overflow = || StorageError::Overflow {
        table: table.to_string(),
        column: column.to_string(),
    };
    match dtype {
        DataType::Int => {
            let mut total: i64 = 0;
            for row in rows {
                if let Value::Int(n) = row.values[idx] {
                    total = total.checked_add(n).ok_or_else(overflow)?;
                }
            }
            Ok(Value::Int(total))
        }
        DataType::Decimal => {
            let mut total = Decimal::ZERO;
            for row in rows {
                if let Value::Decimal(d) = row.values[idx] {
                    total = total.checked_add(d).ok_or_else(overflow)?;
                }
            }
            Ok(Value::Decimal(total))
        }
        other => Err(StorageError::TypeMismatch {
            table: table.to_string(),
            column: column.to_string(),
            expected: "int or decimal".to_string(),
            found: other.to_string(),
        }),
    }
}
