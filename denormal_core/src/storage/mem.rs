use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

use crate::error::StorageError;
use crate::storage::engine::StorageEngine;
use crate::storage::schema::{Column, Schema};
use crate::types::value::Value;
use crate::types::{Record, Row};

#[derive(Debug, Clone)]
struct Table {
    schema: Schema,
    pk_index: usize,
    rows: BTreeMap<i64, Row>,
}

/// Entry of the undo log kept while a transaction is active
#[derive(Debug)]
enum Undo {
    Inserted { table: String, pk: i64 },
    Updated { table: String, pk: i64, row: Row },
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    /// `Some` while a transaction is active
    undo: Option<Vec<Undo>>,
    /// Tables written since the last commit or rollback
    dirty: BTreeSet<String>,
}

/// In-memory storage implementation keyed by primary key
#[derive(Debug, Default)]
pub struct MemStorage {
    state: RefCell<State>,
}

impl MemStorage {
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(&self) -> bool {
        self.state.borrow().undo.is_some()
    }

    /// Registers a table with rows read from elsewhere. Nothing is
    /// recorded in the undo log or the dirty set.
    pub(crate) fn load_table(
        &self,
        table: &str,
        schema: &Schema,
        rows: Vec<Row>,
    ) -> Result<(), StorageError> {
        let mut loaded = new_table(table, schema)?;
        for row in rows {
            insert_into(&mut loaded, table, row)?;
        }
        let mut state = self.state.borrow_mut();
        if state.tables.contains_key(table) {
            return Err(StorageError::TableExists(table.to_string()));
        }
        state.tables.insert(table.to_string(), loaded);
        Ok(())
    }

    pub(crate) fn dirty_tables(&self) -> Vec<String> {
        self.state.borrow().dirty.iter().cloned().collect()
    }

    pub(crate) fn clear_dirty(&self) {
        self.state.borrow_mut().dirty.clear();
    }

    /// Rows of a table in key order, for persistence
    pub(crate) fn rows(&self, table: &str) -> Result<Vec<Row>, StorageError> {
        let state = self.state.borrow();
        let t = lookup(&state.tables, table)?;
        Ok(t.rows.values().cloned().collect())
    }
}

fn new_table(name: &str, schema: &Schema) -> Result<Table, StorageError> {
    schema.validate(name)?;
    let pk_index = schema
        .pk_index()
        .ok_or_else(|| StorageError::InvalidSchema {
            table: name.to_string(),
            reason: format!("primary key '{}' is not a column", schema.primary_key),
        })?;
    Ok(Table {
        schema: schema.clone(),
        pk_index,
        rows: BTreeMap::new(),
    })
}

fn lookup<'a>(tables: &'a HashMap<String, Table>, table: &str) -> Result<&'a Table, StorageError> {
    tables
        .get(table)
        .ok_or_else(|| StorageError::UnknownTable(table.to_string()))
}

fn check_value(table: &str, column: &Column, value: &Value) -> Result<(), StorageError> {
    match value.data_type() {
        None if column.nullable => Ok(()),
        None => Err(StorageError::NotNullable {
            table: table.to_string(),
            column: column.name.clone(),
        }),
        Some(dtype) if dtype == column.dtype => Ok(()),
        Some(_) => Err(StorageError::TypeMismatch {
            table: table.to_string(),
            column: column.name.clone(),
            expected: column.dtype.to_string(),
            found: value.type_name().to_string(),
        }),
    }
}

fn insert_into(t: &mut Table, table: &str, row: Row) -> Result<i64, StorageError> {
    if row.len() != t.schema.column_count() {
        return Err(StorageError::Arity {
            table: table.to_string(),
            expected: t.schema.column_count(),
            found: row.len(),
        });
    }
    for (column, value) in t.schema.columns.iter().zip(&row) {
        check_value(table, column, value)?;
    }
    let pk = match row[t.pk_index].as_int() {
        Some(pk) if pk > 0 => pk,
        _ => {
            return Err(StorageError::InvalidPrimaryKey {
                table: table.to_string(),
                found: row[t.pk_index].to_string(),
            });
        }
    };
    if t.rows.contains_key(&pk) {
        return Err(StorageError::DuplicateKey {
            table: table.to_string(),
            pk,
        });
    }
    t.rows.insert(pk, row);
    Ok(pk)
}

impl StorageEngine for MemStorage {
    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError> {
        if self.in_transaction() {
            return Err(StorageError::TransactionActive);
        }
        self.load_table(table, schema, Vec::new())
    }

    fn schema(&self, table: &str) -> Result<Schema, StorageError> {
        let state = self.state.borrow();
        Ok(lookup(&state.tables, table)?.schema.clone())
    }

    fn insert(&self, table: &str, row: Row) -> Result<i64, StorageError> {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;
        let pk = insert_into(t, table, row)?;
        if let Some(undo) = state.undo.as_mut() {
            undo.push(Undo::Inserted {
                table: table.to_string(),
                pk,
            });
        }
        state.dirty.insert(table.to_string());
        Ok(pk)
    }

    fn count(&self, table: &str) -> Result<usize, StorageError> {
        let state = self.state.borrow();
        Ok(lookup(&state.tables, table)?.rows.len())
    }

    fn max_pk(&self, table: &str) -> Result<Option<i64>, StorageError> {
        let state = self.state.borrow();
        Ok(lookup(&state.tables, table)?.rows.keys().next_back().copied())
    }

    fn fetch_after(
        &self,
        table: &str,
        after: i64,
        limit: usize,
    ) -> Result<Vec<Record>, StorageError> {
        let state = self.state.borrow();
        let t = lookup(&state.tables, table)?;
        Ok(t.rows
            .range((Bound::Excluded(after), Bound::Unbounded))
            .take(limit)
            .map(|(pk, row)| Record::new(*pk, row.clone()))
            .collect())
    }

    fn get(&self, table: &str, pk: i64) -> Result<Option<Record>, StorageError> {
        let state = self.state.borrow();
        let t = lookup(&state.tables, table)?;
        Ok(t.rows.get(&pk).map(|row| Record::new(pk, row.clone())))
    }

    fn find_by(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StorageError> {
        let state = self.state.borrow();
        let t = lookup(&state.tables, table)?;
        let idx = t
            .schema
            .column_index(column)
            .ok_or_else(|| StorageError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        Ok(t.rows
            .iter()
            .filter(|(_, row)| &row[idx] == value)
            .map(|(pk, row)| Record::new(*pk, row.clone()))
            .collect())
    }

    fn count_by(&self, table: &str, column: &str, value: &Value) -> Result<usize, StorageError> {
        let state = self.state.borrow();
        let t = lookup(&state.tables, table)?;
        let idx = t
            .schema
            .column_index(column)
            .ok_or_else(|| StorageError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        Ok(t.rows.values().filter(|row| &row[idx] == value).count())
    }

    fn update_columns(
        &self,
        table: &str,
        pk: i64,
        values: &[(String, Value)],
    ) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let t = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::UnknownTable(table.to_string()))?;

        // Validate everything before touching the row
        let mut resolved = Vec::with_capacity(values.len());
        for (column, value) in values {
            let idx = t
                .schema
                .column_index(column)
                .ok_or_else(|| StorageError::UnknownColumn {
                    table: table.to_string(),
                    column: column.clone(),
                })?;
            check_value(table, &t.schema.columns[idx], value)?;
            if idx == t.pk_index && value.as_int() != Some(pk) {
                return Err(StorageError::PrimaryKeyUpdate {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
            resolved.push((idx, value));
        }

        let row = t
            .rows
            .get_mut(&pk)
            .ok_or_else(|| StorageError::RowNotFound {
                table: table.to_string(),
                pk,
            })?;
        if let Some(undo) = state.undo.as_mut() {
            undo.push(Undo::Updated {
                table: table.to_string(),
                pk,
                row: row.clone(),
            });
        }
        for (idx, value) in resolved {
            row[idx] = value.clone();
        }
        state.dirty.insert(table.to_string());
        Ok(())
    }

    fn begin(&self) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.undo.is_some() {
            return Err(StorageError::TransactionActive);
        }
        state.undo = Some(Vec::new());
        Ok(())
    }

    fn commit(&self) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        state.undo.take().ok_or(StorageError::NoTransaction)?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        let undo = state.undo.take().ok_or(StorageError::NoTransaction)?;
        for entry in undo.into_iter().rev() {
            match entry {
                Undo::Inserted { table, pk } => {
                    if let Some(t) = state.tables.get_mut(&table) {
                        t.rows.remove(&pk);
                    }
                }
                Undo::Updated { table, pk, row } => {
                    if let Some(t) = state.tables.get_mut(&table) {
                        t.rows.insert(pk, row);
                    }
                }
            }
        }
        state.dirty.clear();
        Ok(())
    }
}
