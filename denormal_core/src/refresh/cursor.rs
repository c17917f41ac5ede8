use std::iter::FusedIterator;

use tracing::debug;

use crate::error::{DenormalError, StorageError};
use crate::storage::StorageEngine;
use crate::types::Record;

/// Keyset-paginated walk over a table in ascending primary key order.
///
/// The largest key is captured when the cursor is created. Rows inserted
/// later with a larger key are never visited, and rows inserted behind the
/// cursor are skipped. At most one chunk of rows is held at a time.
pub struct ChunkedCursor<'s> {
    storage: &'s dyn StorageEngine,
    table: String,
    chunk_size: usize,
    last_pk: i64,
    /// `None` once the walk is over
    max_pk: Option<i64>,
    chunk: std::vec::IntoIter<Record>,
}

impl<'s> ChunkedCursor<'s> {
    pub fn new(
        storage: &'s dyn StorageEngine,
        table: impl Into<String>,
        chunk_size: usize,
    ) -> Result<Self, DenormalError> {
        if chunk_size == 0 {
            return Err(DenormalError::InvalidChunkSize);
        }
        let table = table.into();
        let max_pk = storage.max_pk(&table)?;
        Ok(Self {
            storage,
            table,
            chunk_size,
            last_pk: 0,
            max_pk,
            chunk: Vec::new().into_iter(),
        })
    }

    /// Highest primary key handed out so far, 0 before the first row
    pub fn last_pk(&self) -> i64 {
        self.last_pk
    }

    fn finish(&mut self) {
        self.max_pk = None;
        self.chunk = Vec::new().into_iter();
    }
}

impl Iterator for ChunkedCursor<'_> {
    type Item = Result<Record, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let max_pk = self.max_pk?;
            if let Some(record) = self.chunk.next() {
                // The last chunk can reach past the captured maximum
                if record.pk > max_pk {
                    self.finish();
                    return None;
                }
                self.last_pk = record.pk;
                return Some(Ok(record));
            }

            if self.last_pk >= max_pk {
                self.finish();
                return None;
            }

            // Replacing the exhausted chunk releases its buffer
            match self
                .storage
                .fetch_after(&self.table, self.last_pk, self.chunk_size)
            {
                Ok(rows) if rows.is_empty() => {
                    self.finish();
                    return None;
                }
                Ok(rows) => {
                    debug!(
                        table = %self.table,
                        after = self.last_pk,
                        rows = rows.len(),
                        "fetched chunk"
                    );
                    self.chunk = rows.into_iter();
                }
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl FusedIterator for ChunkedCursor<'_> {}
