// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage Manager - owns the storage driver behind the catalog
//!
//! Responsibilities:
//! - Opening the configured driver and the catalog trees
//! - Allocating row ids from persisted per-table sequences
//! - Encoding rows with bincode
//! - Serialising writers, so uniqueness and foreign-key checks done by the
//!   catalog services are not raced by another writer
//! - Flushing after writes when configured to

use crate::storage::keys::RowId;
use crate::storage::persistent::{
    create_storage_driver, DynStorageDriver, StorageResult, StorageTree, StorageType,
};
use log::{debug, info};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Tree holding the last row id handed out for each table
const SEQUENCES_TREE: &str = "__sequences";

/// Storage manager shared by every catalog service
pub struct StorageManager {
    /// Single storage driver instance, created once at initialization
    driver: DynStorageDriver,

    /// Row id sequences, keyed by table name
    sequences: Box<dyn StorageTree>,

    /// Held for the duration of every catalog mutation; re-entrant so a
    /// cascading delete can call into other services while holding it
    write_lock: ReentrantMutex<()>,

    /// Flush the driver after each committed mutation
    flush_on_write: bool,
}

impl StorageManager {
    /// Open (or create) a catalog store at `path`
    pub fn new<P: AsRef<Path>>(
        path: P,
        storage_type: StorageType,
        flush_on_write: bool,
    ) -> StorageResult<Self> {
        info!(
            "Opening catalog storage with {} at path: {:?}",
            storage_type,
            path.as_ref()
        );

        let driver = create_storage_driver(storage_type, path.as_ref())?;
        let sequences = driver.open_tree(SEQUENCES_TREE)?;

        Ok(Self {
            driver,
            sequences,
            write_lock: ReentrantMutex::new(()),
            flush_on_write,
        })
    }

    /// Create a throwaway in-memory store
    pub fn in_memory() -> StorageResult<Self> {
        Self::new("", StorageType::Memory, false)
    }

    /// Open or create a named tree
    pub fn open_tree(&self, name: &str) -> StorageResult<Box<dyn StorageTree>> {
        debug!("Opening tree: {}", name);
        self.driver.open_tree(name)
    }

    /// Acquire the catalog write lock
    pub fn lock_writes(&self) -> ReentrantMutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    /// Allocate the next row id for `table`
    ///
    /// Ids start at 1 and are never reused, even after deletes. Callers must
    /// hold the write lock.
    pub fn next_row_id(&self, table: &str) -> StorageResult<RowId> {
        let last: RowId = match self.sequences.get(table.as_bytes())? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => 0,
        };
        let next = last + 1;
        self.sequences
            .insert(table.as_bytes(), &bincode::serialize(&next)?)?;
        debug!("Allocated row id {} for table '{}'", next, table);
        Ok(next)
    }

    /// Encode a row for storage
    pub fn encode_row<T: Serialize>(row: &T) -> StorageResult<Vec<u8>> {
        Ok(bincode::serialize(row)?)
    }

    /// Decode a stored row
    pub fn decode_row<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Finish a mutation: flush if the store is configured to
    pub fn commit(&self) -> StorageResult<()> {
        if self.flush_on_write {
            self.driver.flush()?;
        }
        Ok(())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> StorageResult<()> {
        self.driver.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_ids_are_per_table_and_monotonic() {
        let storage = StorageManager::in_memory().unwrap();
        let _guard = storage.lock_writes();

        assert_eq!(storage.next_row_id("function_catalog").unwrap(), 1);
        assert_eq!(storage.next_row_id("function_catalog").unwrap(), 2);
        assert_eq!(storage.next_row_id("column_catalog").unwrap(), 1);
        assert_eq!(storage.next_row_id("function_catalog").unwrap(), 3);
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_sequences_survive_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        {
            let storage = StorageManager::new(temp_dir.path(), StorageType::Sled, true).unwrap();
            let _guard = storage.lock_writes();
            storage.next_row_id("function_cache").unwrap();
            storage.next_row_id("function_cache").unwrap();
            storage.commit().unwrap();
        }

        let storage = StorageManager::new(temp_dir.path(), StorageType::Sled, true).unwrap();
        let _guard = storage.lock_writes();
        assert_eq!(storage.next_row_id("function_cache").unwrap(), 3);
    }
}
