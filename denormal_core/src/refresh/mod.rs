//! Bulk recomputation of denormalized fields.
//!
//! Targets are grouped by table, each table is walked once with a
//! [`ChunkedCursor`], and every record gets a partial save of exactly the
//! requested columns. The whole run is a single transaction.

pub mod cursor;
pub mod progress;
pub mod target;
pub mod transaction;

use tracing::info;

use crate::error::{DenormalError, Result, StorageError};
use crate::model::{Model, ModelRegistry};
use crate::storage::StorageEngine;
use crate::types::Record;

pub use cursor::ChunkedCursor;
pub use progress::{with_progress, Progress, WithProgress};
pub use target::{group_targets, TableGroup, Target};
pub use transaction::Transaction;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Outcome for one table of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Refreshes denormalized columns across one or more tables.
pub struct FieldUpdater<'a> {
    storage: &'a dyn StorageEngine,
    registry: &'a dyn ModelRegistry,
    chunk_size: usize,
}

impl<'a> FieldUpdater<'a> {
    pub fn new(storage: &'a dyn StorageEngine, registry: &'a dyn ModelRegistry) -> Self {
        Self {
            storage,
            registry,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Refreshes every `table.column` target in one transaction.
    ///
    /// All targets are parsed before anything is written. A model that
    /// cannot be resolved or a write that storage rejects rolls back every
    /// table processed so far.
    pub fn run<'p, S: AsRef<str>>(
        &self,
        targets: &[S],
        mut progress: Option<&mut (dyn Progress + 'p)>,
    ) -> Result<Vec<TableReport>> {
        let groups = group_targets(targets)?;
        if self.chunk_size == 0 {
            return Err(DenormalError::InvalidChunkSize);
        }

        let tx = Transaction::begin(self.storage)?;
        let mut reports = Vec::with_capacity(groups.len());
        for group in &groups {
            reports.push(self.update_table(group, progress.as_deref_mut())?);
        }
        tx.commit()?;

        info!(
            tables = reports.len(),
            rows = reports.iter().map(|r| r.rows).sum::<usize>(),
            "denormalized fields updated"
        );
        Ok(reports)
    }

    fn update_table<'p>(
        &self,
        group: &TableGroup,
        progress: Option<&mut (dyn Progress + 'p)>,
    ) -> Result<TableReport> {
        let model = self.registry.get_model(&group.table)?;
        let records = ChunkedCursor::new(self.storage, model.name(), self.chunk_size)?;
        info!(table = %model.name(), columns = ?group.columns, "updating table");

        let rows = match progress {
            Some(progress) => {
                let total = self.storage.count(model.name())?;
                let records = with_progress(records, progress, model.name(), total);
                self.save_all(model, records, &group.columns)?
            }
            None => self.save_all(model, records, &group.columns)?,
        };

        info!(table = %model.name(), rows, "table done");
        Ok(TableReport {
            table: model.name().to_string(),
            columns: group.columns.clone(),
            rows,
        })
    }

    fn save_all<I>(&self, model: &Model, records: I, columns: &[String]) -> Result<usize>
    where
        I: Iterator<Item = Result<Record, StorageError>>,
    {
        let mut rows = 0;
        for record in records {
            let record = record?;
            model.save_fields(self.storage, &record, columns)?;
            rows += 1;
        }
        Ok(rows)
    }
}
