// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Column catalog service

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::models::column::{COLUMN_TABLE, MAX_COLUMN_NAME_LEN};
use crate::catalog::models::{ColumnCatalogEntry, ColumnType};
use crate::catalog::traits::{CatalogSchema, CatalogTable, ColumnSchema};
use crate::storage::keys::{read_row_id, row_key, KeyBuilder, RowId};
use crate::storage::{StorageManager, StorageTree};
use log::debug;
use std::sync::Arc;

pub struct ColumnCatalogService {
    storage: Arc<StorageManager>,
    rows: Box<dyn StorageTree>,
    /// (table_id, name) -> row key
    by_table_name: Box<dyn StorageTree>,
}

impl ColumnCatalogService {
    pub fn new(storage: Arc<StorageManager>) -> CatalogResult<Self> {
        let rows = storage.open_tree(COLUMN_TABLE)?;
        let by_table_name = storage.open_tree(&format!("{}.uq_name_table", COLUMN_TABLE))?;
        Ok(Self {
            storage,
            rows,
            by_table_name,
        })
    }

    fn unique_key(table_id: RowId, name: &str) -> Vec<u8> {
        KeyBuilder::new().row_id(table_id).str(name).build()
    }

    pub fn insert(
        &self,
        table_id: RowId,
        name: &str,
        column_type: ColumnType,
        is_nullable: bool,
    ) -> CatalogResult<ColumnCatalogEntry> {
        let _guard = self.storage.lock_writes();

        let mut entry = ColumnCatalogEntry {
            row_id: 0,
            name: name.to_string(),
            table_id,
            column_type,
            is_nullable,
        };
        entry.check_widths()?;

        let unique_key = Self::unique_key(table_id, name);
        if self.by_table_name.contains_key(&unique_key)? {
            return Err(CatalogError::UniquenessViolation {
                table: COLUMN_TABLE.to_string(),
                key: format!("(name={:?}, table_id={})", name, table_id),
            });
        }

        entry.row_id = self.storage.next_row_id(COLUMN_TABLE)?;
        let key = row_key(entry.row_id);
        self.rows
            .insert(&key, &StorageManager::encode_row(&entry)?)?;
        self.by_table_name.insert(&unique_key, &key)?;
        self.storage.commit()?;

        debug!(
            "Inserted column '{}' of table {} as row {}",
            name, table_id, entry.row_id
        );
        Ok(entry)
    }

    pub fn get_by_id(&self, row_id: RowId) -> CatalogResult<Option<ColumnCatalogEntry>> {
        match self.rows.get(&row_key(row_id))? {
            Some(bytes) => Ok(Some(StorageManager::decode_row(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_by_name(
        &self,
        table_id: RowId,
        name: &str,
    ) -> CatalogResult<Option<ColumnCatalogEntry>> {
        match self.by_table_name.get(&Self::unique_key(table_id, name))? {
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

    /// Columns of one table, in index order (shorter names first)
    pub fn list_by_table(&self, table_id: RowId) -> CatalogResult<Vec<ColumnCatalogEntry>> {
        let prefix = KeyBuilder::new().row_id(table_id).build();
        let mut entries = Vec::new();
        for item in self.by_table_name.scan_prefix(&prefix)? {
            let (_, key) = item?;
            if let Some(entry) = read_row_id(&key, 0)
                .map(|id| self.get_by_id(id))
                .transpose()?
                .flatten()
            {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Delete the row and its unique index entry, nothing else
    pub(crate) fn remove(&self, row_id: RowId) -> CatalogResult<Option<ColumnCatalogEntry>> {
        let _guard = self.storage.lock_writes();
        let Some(entry) = self.get_by_id(row_id)? else {
            return Ok(None);
        };
        self.rows.remove(&row_key(row_id))?;
        self.by_table_name
            .remove(&Self::unique_key(entry.table_id, &entry.name))?;
        debug!("Removed column '{}' (row {})", entry.name, row_id);
        Ok(Some(entry))
    }
}

impl CatalogTable for ColumnCatalogService {
    fn schema(&self) -> CatalogSchema {
        CatalogSchema {
            name: COLUMN_TABLE.to_string(),
            columns: vec![
                ColumnSchema::integer("_row_id"),
                ColumnSchema::varchar("name", MAX_COLUMN_NAME_LEN),
                ColumnSchema::other("type", "ENUM"),
                ColumnSchema::other("is_nullable", "BOOLEAN"),
                ColumnSchema::integer("table_id").references("table_catalog._row_id", true),
            ],
            unique: vec![vec!["name".to_string(), "table_id".to_string()]],
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

    fn service() -> ColumnCatalogService {
        ColumnCatalogService::new(Arc::new(StorageManager::in_memory().unwrap())).unwrap()
    }

    #[test]
    fn test_same_name_in_different_tables() {
        let columns = service();
        let a = columns.insert(1, "id", ColumnType::Integer, false).unwrap();
        let b = columns.insert(2, "id", ColumnType::Integer, false).unwrap();
        assert_ne!(a.row_id, b.row_id);

        let err = columns
            .insert(1, "id", ColumnType::Text, true)
            .unwrap_err();
        assert!(matches!(err, CatalogError::UniquenessViolation { .. }));

        assert_eq!(columns.get_by_name(2, "id").unwrap(), Some(b));
    }

    #[test]
    fn test_list_by_table_ordered_by_name() {
        let columns = service();
        columns.insert(1, "frame", ColumnType::NdArray, false).unwrap();
        columns.insert(1, "bbox", ColumnType::NdArray, true).unwrap();
        columns.insert(2, "label", ColumnType::Text, true).unwrap();

        let names: Vec<String> = columns
            .list_by_table(1)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        // keys are length-prefixed, so shorter names sort first
        assert_eq!(names, vec!["bbox".to_string(), "frame".to_string()]);
    }

    #[test]
    fn test_remove_column() {
        let columns = service();
        let frame = columns.insert(1, "frame", ColumnType::NdArray, false).unwrap();
        assert_eq!(columns.remove(frame.row_id).unwrap(), Some(frame.clone()));
        assert_eq!(columns.remove(frame.row_id).unwrap(), None);
        assert!(columns.get_by_name(1, "frame").unwrap().is_none());
        assert_eq!(columns.row_count().unwrap(), 0);
    }
}
