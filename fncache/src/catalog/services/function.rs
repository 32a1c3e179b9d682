// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function catalog service

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::models::function::{
    FUNCTION_TABLE, MAX_CHECKSUM_LEN, MAX_FUNCTION_NAME_LEN, MAX_FUNCTION_TYPE_LEN,
    MAX_IMPL_PATH_LEN,
};
use crate::catalog::models::FunctionCatalogEntry;
use crate::catalog::traits::{CatalogSchema, CatalogTable, ColumnSchema};
use crate::storage::keys::{read_row_id, row_key, KeyBuilder, RowId};
use crate::storage::{StorageManager, StorageTree};
use log::debug;
use std::sync::Arc;

pub struct FunctionCatalogService {
    storage: Arc<StorageManager>,
    rows: Box<dyn StorageTree>,
    /// name -> row key
    by_name: Box<dyn StorageTree>,
}

impl FunctionCatalogService {
    pub fn new(storage: Arc<StorageManager>) -> CatalogResult<Self> {
        let rows = storage.open_tree(FUNCTION_TABLE)?;
        let by_name = storage.open_tree(&format!("{}.uq_name", FUNCTION_TABLE))?;
        Ok(Self {
            storage,
            rows,
            by_name,
        })
    }

    fn name_key(name: &str) -> Vec<u8> {
        KeyBuilder::new().str(name).build()
    }

    pub fn insert(
        &self,
        name: &str,
        impl_file_path: &str,
        function_type: &str,
        checksum: &str,
    ) -> CatalogResult<FunctionCatalogEntry> {
        let _guard = self.storage.lock_writes();

        let mut entry = FunctionCatalogEntry {
            row_id: 0,
            name: name.to_string(),
            impl_file_path: impl_file_path.to_string(),
            function_type: function_type.to_string(),
            checksum: checksum.to_string(),
        };
        entry.check_widths()?;

        let name_key = Self::name_key(name);
        if self.by_name.contains_key(&name_key)? {
            return Err(CatalogError::UniquenessViolation {
                table: FUNCTION_TABLE.to_string(),
                key: format!("name={:?}", name),
            });
        }

        entry.row_id = self.storage.next_row_id(FUNCTION_TABLE)?;
        let key = row_key(entry.row_id);
        self.rows
            .insert(&key, &StorageManager::encode_row(&entry)?)?;
        self.by_name.insert(&name_key, &key)?;
        self.storage.commit()?;

        debug!("Inserted function '{}' as row {}", name, entry.row_id);
        Ok(entry)
    }

    pub fn get_by_id(&self, row_id: RowId) -> CatalogResult<Option<FunctionCatalogEntry>> {
        match self.rows.get(&row_key(row_id))? {
            Some(bytes) => Ok(Some(StorageManager::decode_row(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_by_name(&self, name: &str) -> CatalogResult<Option<FunctionCatalogEntry>> {
        match self.by_name.get(&Self::name_key(name))? {
            Some(key) => match read_row_id(&key, 0) {
                Some(row_id) => self.get_by_id(row_id),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    pub fn exists(&self, row_id: RowId) -> CatalogResult<bool> {
        Ok(self.rows.contains_key(&row_key(row_id))?)
    }

    /// All functions ordered by row id
    pub fn list(&self) -> CatalogResult<Vec<FunctionCatalogEntry>> {
        let mut entries = Vec::new();
        for item in self.rows.iter()? {
            let (_, bytes) = item?;
            entries.push(StorageManager::decode_row(&bytes)?);
        }
        Ok(entries)
    }

    /// Delete the row and its name index entry, nothing else
    ///
    /// Dependent caches are handled by `CatalogManager`, which is the only
    /// caller.
    pub(crate) fn remove(&self, entry: &FunctionCatalogEntry) -> CatalogResult<()> {
        let _guard = self.storage.lock_writes();
        self.rows.remove(&row_key(entry.row_id))?;
        self.by_name.remove(&Self::name_key(&entry.name))?;
        debug!("Removed function '{}' (row {})", entry.name, entry.row_id);
        Ok(())
    }
}

impl CatalogTable for FunctionCatalogService {
    fn schema(&self) -> CatalogSchema {
        CatalogSchema {
            name: FUNCTION_TABLE.to_string(),
            columns: vec![
                ColumnSchema::integer("_row_id"),
                ColumnSchema::varchar("name", MAX_FUNCTION_NAME_LEN),
                ColumnSchema::varchar("impl_file_path", MAX_IMPL_PATH_LEN),
                ColumnSchema::varchar("type", MAX_FUNCTION_TYPE_LEN),
                ColumnSchema::varchar("checksum", MAX_CHECKSUM_LEN),
            ],
            unique: vec![vec!["name".to_string()]],
        }
    }

    fn row_count(&self) -> CatalogResult<usize> {
        let mut count = 0;
        for item in self.rows.iter()? {
            item?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> FunctionCatalogService {
        FunctionCatalogService::new(Arc::new(StorageManager::in_memory().unwrap())).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let functions = service();
        let blur = functions
            .insert("Blur", "functions/blur.py", "Filter", "0badc0de")
            .unwrap();
        let crop = functions
            .insert("Crop", "functions/crop.py", "Transform", "12345678")
            .unwrap();

        assert_eq!(blur.row_id, 1);
        assert_eq!(crop.row_id, 2);
        assert_eq!(functions.get_by_name("Blur").unwrap(), Some(blur.clone()));
        assert_eq!(functions.get_by_id(2).unwrap(), Some(crop));
        assert!(functions.get_by_name("Sharpen").unwrap().is_none());
        assert!(functions.exists(1).unwrap());
        assert!(!functions.exists(3).unwrap());
        assert_eq!(functions.row_count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let functions = service();
        functions.insert("Blur", "a.py", "Filter", "").unwrap();
        let err = functions.insert("Blur", "b.py", "Filter", "").unwrap_err();
        assert!(matches!(err, CatalogError::UniquenessViolation { .. }));
        assert_eq!(functions.row_count().unwrap(), 1);
    }

    #[test]
    fn test_remove_frees_name() {
        let functions = service();
        let blur = functions.insert("Blur", "a.py", "Filter", "").unwrap();
        functions.remove(&blur).unwrap();

        assert!(functions.get_by_name("Blur").unwrap().is_none());
        let again = functions.insert("Blur", "a.py", "Filter", "").unwrap();
        assert_eq!(again.row_id, 2);
    }
}
