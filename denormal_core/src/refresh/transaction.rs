use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage::StorageEngine;

/// Scoped transaction. Rolls back on drop unless [`Transaction::commit`]
/// succeeded, which covers `?` returns and unwinding alike.
pub struct Transaction<'s> {
    storage: &'s dyn StorageEngine,
    done: bool,
}

impl<'s> Transaction<'s> {
    pub fn begin(storage: &'s dyn StorageEngine) -> Result<Self, StorageError> {
        storage.begin()?;
        debug!("transaction started");
        Ok(Self {
            storage,
            done: false,
        })
    }

    /// On failure the guard is dropped and the transaction rolled back.
    pub fn commit(mut self) -> Result<(), StorageError> {
        self.storage.commit()?;
        self.done = true;
        debug!("transaction committed");
        Ok(())
    }

    pub fn rollback(mut self) -> Result<(), StorageError> {
        self.done = true;
        self.storage.rollback()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        match self.storage.rollback() {
            Ok(()) => warn!("transaction rolled back"),
            Err(err) => warn!(error = %err, "rollback failed"),
        }
    }
}
