// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver factory
//!
//! Creates the configured storage driver as a trait object.

use super::traits::{StorageDriver, StorageTree};
use super::types::StorageResult;
#[cfg(not(feature = "sled-backend"))]
use super::types::StorageDriverError;
use super::types::StorageType;
use std::path::Path;

/// Boxed driver handed to the storage manager
pub type DynStorageDriver = Box<dyn StorageDriver<Tree = Box<dyn StorageTree>>>;

/// Factory function to create a storage driver based on configuration
///
/// # Arguments
/// * `storage_type` - The type of storage driver to create
/// * `path` - The filesystem path where the database should be stored
///   (ignored by the memory driver)
///
/// # Examples
/// ```ignore
/// let driver = create_storage_driver(StorageType::Sled, "./catalog")?;
/// let tree = driver.open_tree("function_cache")?;
/// ```
pub fn create_storage_driver<P: AsRef<Path>>(
    storage_type: StorageType,
    path: P,
) -> StorageResult<DynStorageDriver> {
    match storage_type {
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use crate::storage::persistent::sled::SledDriver;
            let driver = SledDriver::open(path)?;
            Ok(Box::new(driver) as DynStorageDriver)
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => Err(StorageDriverError::Unavailable(StorageType::Sled)),
        StorageType::Memory => {
            use crate::storage::persistent::memory::MemoryStorageDriver;
            let driver = MemoryStorageDriver::open(path)?;
            Ok(Box::new(driver) as DynStorageDriver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_create_sled_driver() {
        let temp_dir = TempDir::new().unwrap();
        let driver = create_storage_driver(StorageType::Sled, temp_dir.path()).unwrap();
        let tree = driver.open_tree("function_cache").unwrap();
        tree.insert(b"k", b"v").unwrap();
        driver.flush().unwrap();
        drop(tree);
        drop(driver);

        let driver = create_storage_driver(StorageType::Sled, temp_dir.path()).unwrap();
        let tree = driver.open_tree("function_cache").unwrap();
        assert_eq!(tree.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_create_memory_driver() {
        let temp_dir = TempDir::new().unwrap();
        let driver = create_storage_driver(StorageType::Memory, temp_dir.path()).unwrap();
        let tree = driver.open_tree("function_cache").unwrap();
        tree.insert(b"k", b"v").unwrap();
        assert!(tree.contains_key(b"k").unwrap());
        // nothing is written under the path
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
