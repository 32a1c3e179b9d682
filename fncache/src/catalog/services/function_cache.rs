// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function cache catalog service
//!
//! Owns the `function_cache` table, its two indexes and the two dependency
//! join tables. Trees:
//! - `function_cache`: row id -> encoded [`FunctionCacheCatalog`]
//! - `function_cache.uq_name_function`: (name, function_id) -> row key;
//!   enforces the unique constraint and serves lookups by name
//! - `function_cache.by_function`: (function_id, row id) -> (); the
//!   foreign-key side used by cascading deletes

use super::association::JoinTableService;
use super::column::ColumnCatalogService;
use super::function::FunctionCatalogService;
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::models::function_cache::{
    FUNCTION_CACHE_TABLE, MAX_ARGS_LEN, MAX_CACHE_PATH_LEN, MAX_NAME_LEN,
};
use crate::catalog::models::{
    DependencyRow, FunctionCacheCatalog, FunctionCacheCatalogEntry, FunctionCacheColumnDepend,
    FunctionCacheFunctionDepend, NewFunctionCache,
};
use crate::catalog::traits::{CatalogSchema, CatalogTable, ColumnSchema};
use crate::storage::keys::{read_row_id, row_key, trailing_row_id, KeyBuilder, RowId};
use crate::storage::{StorageManager, StorageTree};
use log::{debug, warn};
use std::sync::Arc;

pub struct FunctionCacheCatalogService {
    storage: Arc<StorageManager>,
    functions: Arc<FunctionCatalogService>,
    columns: Arc<ColumnCatalogService>,
    rows: Box<dyn StorageTree>,
    by_name_function: Box<dyn StorageTree>,
    by_function: Box<dyn StorageTree>,
    function_depends: JoinTableService<FunctionCacheFunctionDepend>,
    col_depends: JoinTableService<FunctionCacheColumnDepend>,
}

impl FunctionCacheCatalogService {
    pub fn new(
        storage: Arc<StorageManager>,
        functions: Arc<FunctionCatalogService>,
        columns: Arc<ColumnCatalogService>,
    ) -> CatalogResult<Self> {
        Ok(Self {
            rows: storage.open_tree(FUNCTION_CACHE_TABLE)?,
            by_name_function: storage
                .open_tree(&format!("{}.uq_name_function", FUNCTION_CACHE_TABLE))?,
            by_function: storage.open_tree(&format!("{}.by_function", FUNCTION_CACHE_TABLE))?,
            function_depends: JoinTableService::new(&storage)?,
            col_depends: JoinTableService::new(&storage)?,
            storage,
            functions,
            columns,
        })
    }

    fn unique_key(name: &str, function_id: RowId) -> Vec<u8> {
        KeyBuilder::new().str(name).row_id(function_id).build()
    }

    fn function_key(function_id: RowId, row_id: RowId) -> Vec<u8> {
        KeyBuilder::new().row_id(function_id).row_id(row_id).build()
    }

    fn ensure_function(&self, table: &str, column: &str, function_id: RowId) -> CatalogResult<()> {
        if self.functions.exists(function_id)? {
            Ok(())
        } else {
            Err(CatalogError::ForeignKeyViolation {
                table: table.to_string(),
                column: column.to_string(),
                row_id: function_id,
            })
        }
    }

    fn ensure_column(&self, column_id: RowId) -> CatalogResult<()> {
        if self.columns.exists(column_id)? {
            Ok(())
        } else {
            Err(CatalogError::ForeignKeyViolation {
                table: FunctionCacheColumnDepend::TABLE.to_string(),
                column: FunctionCacheColumnDepend::DEPENDENCY_COLUMN.to_string(),
                row_id: column_id,
            })
        }
    }

    fn ensure_cache(&self, row_id: RowId) -> CatalogResult<()> {
        if self.rows.contains_key(&row_key(row_id))? {
            Ok(())
        } else {
            Err(CatalogError::EntityNotFound(format!(
                "function cache with row id {}",
                row_id
            )))
        }
    }

    /// Persist a new cache entry together with its dependencies
    ///
    /// Every referenced function and column must exist. A second entry with
    /// the same `(name, function_id)` fails with `UniquenessViolation`.
    pub fn insert(&self, new: NewFunctionCache) -> CatalogResult<FunctionCacheCatalogEntry> {
        let _guard = self.storage.lock_writes();

        let mut row =
            FunctionCacheCatalog::new(&new.name, new.function_id, &new.cache_path, &new.args)?;

        self.ensure_function(FUNCTION_CACHE_TABLE, "function_id", new.function_id)?;
        for function_id in &new.function_depends {
            self.ensure_function(
                FunctionCacheFunctionDepend::TABLE,
                FunctionCacheFunctionDepend::DEPENDENCY_COLUMN,
                *function_id,
            )?;
        }
        for column_id in &new.col_depends {
            self.ensure_column(*column_id)?;
        }

        let unique_key = Self::unique_key(&new.name, new.function_id);
        if self.by_name_function.contains_key(&unique_key)? {
            return Err(CatalogError::UniquenessViolation {
                table: FUNCTION_CACHE_TABLE.to_string(),
                key: format!("(name={:?}, function_id={})", new.name, new.function_id),
            });
        }

        let row_id = self.storage.next_row_id(FUNCTION_CACHE_TABLE)?;
        row.assign_row_id(row_id);
        let key = row_key(row_id);

        self.rows.insert(&key, &StorageManager::encode_row(&row)?)?;
        self.by_name_function.insert(&unique_key, &key)?;
        self.by_function
            .insert(&Self::function_key(new.function_id, row_id), &[])?;
        for function_id in &new.function_depends {
            self.function_depends
                .insert(FunctionCacheFunctionDepend::new(*function_id, row_id))?;
        }
        for column_id in &new.col_depends {
            self.col_depends
                .insert(FunctionCacheColumnDepend::new(*column_id, row_id))?;
        }
        self.storage.commit()?;

        debug!(
            "Inserted function cache '{}' for function {} as row {}",
            new.name, new.function_id, row_id
        );
        self.snapshot(&row)
    }

    fn snapshot(&self, row: &FunctionCacheCatalog) -> CatalogResult<FunctionCacheCatalogEntry> {
        let (function_depends, col_depends) = match row.row_id() {
            Some(row_id) => (
                self.function_depends.dependencies_of(row_id)?,
                self.col_depends.dependencies_of(row_id)?,
            ),
            None => (Vec::new(), Vec::new()),
        };
        row.as_entry(function_depends, col_depends)
    }

    /// Raw stored row, without decoding its arguments
    pub fn get_row(&self, row_id: RowId) -> CatalogResult<Option<FunctionCacheCatalog>> {
        match self.rows.get(&row_key(row_id))? {
            Some(bytes) => Ok(Some(StorageManager::decode_row(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_by_id(&self, row_id: RowId) -> CatalogResult<Option<FunctionCacheCatalogEntry>> {
        match self.get_row(row_id)? {
            Some(row) => Ok(Some(self.snapshot(&row)?)),
            None => Ok(None),
        }
    }

    /// Look an entry up by name alone
    ///
    /// Names are only unique per function, so this fails with
    /// `AmbiguousName` when several functions own a cache of that name.
    pub fn get_by_name(&self, name: &str) -> CatalogResult<Option<FunctionCacheCatalogEntry>> {
        let prefix = KeyBuilder::new().str(name).build();
        let mut row_ids = Vec::new();
        for item in self.by_name_function.scan_prefix(&prefix)? {
            let (_, key) = item?;
            if let Some(row_id) = read_row_id(&key, 0) {
                row_ids.push(row_id);
            }
        }

        match row_ids.as_slice() {
            [] => Ok(None),
            [row_id] => self.get_by_id(*row_id),
            _ => Err(CatalogError::AmbiguousName(format!(
                "{} function caches are named {:?}",
                row_ids.len(),
                name
            ))),
        }
    }

    pub fn get_by_name_and_function(
        &self,
        name: &str,
        function_id: RowId,
    ) -> CatalogResult<Option<FunctionCacheCatalogEntry>> {
        match self
            .by_name_function
            .get(&Self::unique_key(name, function_id))?
        {
            Some(key) => match read_row_id(&key, 0) {
                Some(row_id) => self.get_by_id(row_id),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// All entries ordered by row id
    pub fn list(&self) -> CatalogResult<Vec<FunctionCacheCatalogEntry>> {
        let mut entries = Vec::new();
        for item in self.rows.iter()? {
            let (_, bytes) = item?;
            let row: FunctionCacheCatalog = StorageManager::decode_row(&bytes)?;
            entries.push(self.snapshot(&row)?);
        }
        Ok(entries)
    }

    /// Row ids of the caches owned by a function, ascending
    pub fn ids_by_function(&self, function_id: RowId) -> CatalogResult<Vec<RowId>> {
        let prefix = KeyBuilder::new().row_id(function_id).build();
        let mut ids = Vec::new();
        for item in self.by_function.scan_prefix(&prefix)? {
            let (key, _) = item?;
            if let Some(id) = trailing_row_id(&key) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn list_by_function(
        &self,
        function_id: RowId,
    ) -> CatalogResult<Vec<FunctionCacheCatalogEntry>> {
        let mut entries = Vec::new();
        for row_id in self.ids_by_function(function_id)? {
            if let Some(entry) = self.get_by_id(row_id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Record that a cache also depends on a function; idempotent
    pub fn add_function_dependency(
        &self,
        function_cache_id: RowId,
        function_id: RowId,
    ) -> CatalogResult<()> {
        let _guard = self.storage.lock_writes();
        self.ensure_cache(function_cache_id)?;
        self.ensure_function(
            FunctionCacheFunctionDepend::TABLE,
            FunctionCacheFunctionDepend::DEPENDENCY_COLUMN,
            function_id,
        )?;
        if self
            .function_depends
            .insert(FunctionCacheFunctionDepend::new(function_id, function_cache_id))?
        {
            self.storage.commit()?;
        }
        Ok(())
    }

    /// Record that a cache depends on a column; idempotent
    pub fn add_column_dependency(
        &self,
        function_cache_id: RowId,
        column_id: RowId,
    ) -> CatalogResult<()> {
        let _guard = self.storage.lock_writes();
        self.ensure_cache(function_cache_id)?;
        self.ensure_column(column_id)?;
        if self
            .col_depends
            .insert(FunctionCacheColumnDepend::new(column_id, function_cache_id))?
        {
            self.storage.commit()?;
        }
        Ok(())
    }

    /// Row ids of the caches that depend on a function, ascending
    pub fn dependents_of_function(&self, function_id: RowId) -> CatalogResult<Vec<RowId>> {
        self.function_depends.caches_depending_on(function_id)
    }

    /// Row ids of the caches that depend on a column, ascending
    pub fn dependents_of_column(&self, column_id: RowId) -> CatalogResult<Vec<RowId>> {
        self.col_depends.caches_depending_on(column_id)
    }

    /// Delete an entry, its index entries and its join rows
    ///
    /// Returns false if no entry has that row id.
    pub fn delete(&self, row_id: RowId) -> CatalogResult<bool> {
        let _guard = self.storage.lock_writes();
        let Some(row) = self.get_row(row_id)? else {
            return Ok(false);
        };

        self.rows.remove(&row_key(row_id))?;
        self.by_name_function
            .remove(&Self::unique_key(row.name(), row.function_id()))?;
        self.by_function
            .remove(&Self::function_key(row.function_id(), row_id))?;
        let function_links = self.function_depends.remove_cache(row_id)?;
        let column_links = self.col_depends.remove_cache(row_id)?;
        self.storage.commit()?;

        debug!(
            "Deleted function cache '{}' (row {}) and {} dependency rows",
            row.name(),
            row_id,
            function_links + column_links
        );
        Ok(true)
    }

    /// Remove the join rows naming a function; returns the affected caches
    pub(crate) fn detach_function(&self, function_id: RowId) -> CatalogResult<Vec<RowId>> {
        let _guard = self.storage.lock_writes();
        self.function_depends.remove_dependency(function_id)
    }

    /// Remove the join rows naming a column; returns the affected caches
    pub(crate) fn detach_column(&self, column_id: RowId) -> CatalogResult<Vec<RowId>> {
        let _guard = self.storage.lock_writes();
        self.col_depends.remove_dependency(column_id)
    }

    /// Stored rows ordered by row id, with their arguments left encoded
    pub fn raw_rows(&self) -> CatalogResult<Vec<(RowId, FunctionCacheCatalog)>> {
        let mut rows = Vec::new();
        for item in self.rows.iter()? {
            let (key, bytes) = item?;
            if let Some(row_id) = read_row_id(&key, 0) {
                rows.push((row_id, StorageManager::decode_row(&bytes)?));
            }
        }
        Ok(rows)
    }

    /// Bring both indexes back in line with the rows tree
    ///
    /// Entries pointing at a missing row are removed and rows missing an
    /// entry get one. Returns the number of entries changed.
    pub(crate) fn repair_indexes(&self) -> CatalogResult<usize> {
        let _guard = self.storage.lock_writes();

        let mut stale_unique = Vec::new();
        for item in self.by_name_function.iter()? {
            let (key, value) = item?;
            let live = match read_row_id(&value, 0) {
                Some(row_id) => self.rows.contains_key(&row_key(row_id))?,
                None => false,
            };
            if !live {
                warn!("Unique index entry of function_cache points at a missing row; removing");
                stale_unique.push(key);
            }
        }

        let mut stale_function = Vec::new();
        for item in self.by_function.iter()? {
            let (key, _) = item?;
            let live = match trailing_row_id(&key) {
                Some(row_id) => self.rows.contains_key(&row_key(row_id))?,
                None => false,
            };
            if !live {
                warn!(
                    "function_cache.by_function entry {:?} points at a missing row; removing",
                    trailing_row_id(&key)
                );
                stale_function.push(key);
            }
        }

        let unique_refs: Vec<&[u8]> = stale_unique.iter().map(Vec::as_slice).collect();
        let function_refs: Vec<&[u8]> = stale_function.iter().map(Vec::as_slice).collect();
        self.by_name_function.batch_remove(&unique_refs)?;
        self.by_function.batch_remove(&function_refs)?;
        let mut changed = stale_unique.len() + stale_function.len();

        for (row_id, row) in self.raw_rows()? {
            let unique_key = Self::unique_key(row.name(), row.function_id());
            if !self.by_name_function.contains_key(&unique_key)? {
                warn!(
                    "Function cache '{}' (row {}) missing from the unique index; restoring",
                    row.name(),
                    row_id
                );
                self.by_name_function.insert(&unique_key, &row_key(row_id))?;
                changed += 1;
            }
            let function_key = Self::function_key(row.function_id(), row_id);
            if !self.by_function.contains_key(&function_key)? {
                warn!(
                    "Function cache '{}' (row {}) missing from the function index; restoring",
                    row.name(),
                    row_id
                );
                self.by_function.insert(&function_key, &[])?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn function_dependency_table(&self) -> &JoinTableService<FunctionCacheFunctionDepend> {
        &self.function_depends
    }

    pub fn column_dependency_table(&self) -> &JoinTableService<FunctionCacheColumnDepend> {
        &self.col_depends
    }
}

impl CatalogTable for FunctionCacheCatalogService {
    fn schema(&self) -> CatalogSchema {
        CatalogSchema {
            name: FUNCTION_CACHE_TABLE.to_string(),
            columns: vec![
                ColumnSchema::integer("_row_id"),
                ColumnSchema::varchar("name", MAX_NAME_LEN),
                ColumnSchema::integer("function_id")
                    .references("function_catalog._row_id", true),
                ColumnSchema::varchar("cache_path", MAX_CACHE_PATH_LEN),
                ColumnSchema::varchar("args", MAX_ARGS_LEN),
            ],
            unique: vec![vec!["name".to_string(), "function_id".to_string()]],
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
    use crate::catalog::models::{CacheArg, CacheArgs, ColumnType};

    struct Harness {
        functions: Arc<FunctionCatalogService>,
        columns: Arc<ColumnCatalogService>,
        caches: FunctionCacheCatalogService,
    }

    fn harness() -> Harness {
        let storage = Arc::new(StorageManager::in_memory().unwrap());
        let functions = Arc::new(FunctionCatalogService::new(storage.clone()).unwrap());
        let columns = Arc::new(ColumnCatalogService::new(storage.clone()).unwrap());
        let caches =
            FunctionCacheCatalogService::new(storage, functions.clone(), columns.clone()).unwrap();
        Harness {
            functions,
            columns,
            caches,
        }
    }

    #[test]
    fn test_insert_returns_plain_record() {
        let h = harness();
        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let frame = h.columns.insert(1, "frame", ColumnType::NdArray, false).unwrap();

        let entry = h
            .caches
            .insert(
                NewFunctionCache::new(
                    "Blur(frame)",
                    blur.row_id,
                    "/cache/blur_1",
                    vec![CacheArg::column(frame.row_id)],
                )
                .depends_on_column(frame.row_id),
            )
            .unwrap();

        assert_eq!(entry.row_id, 1);
        assert_eq!(entry.args, CacheArgs::new(vec![CacheArg::column(frame.row_id)]));
        assert_eq!(entry.col_depends, vec![frame.row_id]);
        assert!(entry.function_depends.is_empty());
        assert_eq!(h.caches.get_by_id(1).unwrap(), Some(entry));
    }

    #[test]
    fn test_missing_references_rejected() {
        let h = harness();
        let err = h
            .caches
            .insert(NewFunctionCache::new("sig", 42, "/c", CacheArgs::default()))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::ForeignKeyViolation {
                table: "function_cache".to_string(),
                column: "function_id".to_string(),
                row_id: 42,
            }
        );

        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let err = h
            .caches
            .insert(
                NewFunctionCache::new("sig", blur.row_id, "/c", CacheArgs::default())
                    .depends_on_column(9),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::ForeignKeyViolation { row_id: 9, .. }));
        assert_eq!(h.caches.row_count().unwrap(), 0);
    }

    #[test]
    fn test_corrupted_args_row_fails_to_read() {
        let h = harness();
        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let entry = h
            .caches
            .insert(NewFunctionCache::new("sig", blur.row_id, "/c", CacheArgs::default()))
            .unwrap();

        let corrupted = h
            .caches
            .get_row(entry.row_id)
            .unwrap()
            .unwrap()
            .with_raw_args("not a tuple");
        h.caches
            .rows
            .insert(
                &row_key(entry.row_id),
                &StorageManager::encode_row(&corrupted).unwrap(),
            )
            .unwrap();

        assert!(matches!(
            h.caches.get_by_id(entry.row_id),
            Err(CatalogError::MalformedEncoding(_))
        ));
        assert!(matches!(
            h.caches.list(),
            Err(CatalogError::MalformedEncoding(_))
        ));
        // the raw row is still reachable so it can be inspected or deleted
        assert_eq!(
            h.caches.get_row(entry.row_id).unwrap().unwrap().encoded_args(),
            "not a tuple"
        );
        assert!(h.caches.delete(entry.row_id).unwrap());
    }

    #[test]
    fn test_get_by_name_ambiguity() {
        let h = harness();
        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let crop = h.functions.insert("Crop", "crop.py", "Filter", "").unwrap();
        h.caches
            .insert(NewFunctionCache::new("sig", blur.row_id, "/a", CacheArgs::default()))
            .unwrap();
        h.caches
            .insert(NewFunctionCache::new("sig2", blur.row_id, "/b", CacheArgs::default()))
            .unwrap();

        assert_eq!(h.caches.get_by_name("sig").unwrap().unwrap().cache_path, "/a");

        h.caches
            .insert(NewFunctionCache::new("sig", crop.row_id, "/c", CacheArgs::default()))
            .unwrap();
        assert!(matches!(
            h.caches.get_by_name("sig"),
            Err(CatalogError::AmbiguousName(_))
        ));
        assert_eq!(
            h.caches
                .get_by_name_and_function("sig", crop.row_id)
                .unwrap()
                .unwrap()
                .cache_path,
            "/c"
        );
    }

    #[test]
    fn test_add_dependencies_is_idempotent() {
        let h = harness();
        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let crop = h.functions.insert("Crop", "crop.py", "Filter", "").unwrap();
        let bbox = h.columns.insert(1, "bbox", ColumnType::NdArray, false).unwrap();
        let entry = h
            .caches
            .insert(NewFunctionCache::new("sig", blur.row_id, "/a", CacheArgs::default()))
            .unwrap();

        h.caches.add_function_dependency(entry.row_id, crop.row_id).unwrap();
        h.caches.add_function_dependency(entry.row_id, crop.row_id).unwrap();
        h.caches.add_column_dependency(entry.row_id, bbox.row_id).unwrap();

        let entry = h.caches.get_by_id(entry.row_id).unwrap().unwrap();
        assert_eq!(entry.function_depends, vec![crop.row_id]);
        assert_eq!(entry.col_depends, vec![bbox.row_id]);
        assert_eq!(h.caches.dependents_of_function(crop.row_id).unwrap(), vec![entry.row_id]);

        assert!(matches!(
            h.caches.add_column_dependency(99, bbox.row_id),
            Err(CatalogError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_delete_clears_indexes_and_join_rows() {
        let h = harness();
        let blur = h.functions.insert("Blur", "blur.py", "Filter", "").unwrap();
        let bbox = h.columns.insert(1, "bbox", ColumnType::NdArray, false).unwrap();
        let entry = h
            .caches
            .insert(
                NewFunctionCache::new("sig", blur.row_id, "/a", CacheArgs::default())
                    .depends_on_function(blur.row_id)
                    .depends_on_column(bbox.row_id),
            )
            .unwrap();

        assert!(h.caches.delete(entry.row_id).unwrap());
        assert!(!h.caches.delete(entry.row_id).unwrap());
        assert!(h.caches.ids_by_function(blur.row_id).unwrap().is_empty());
        assert!(h.caches.dependents_of_column(bbox.row_id).unwrap().is_empty());
        assert_eq!(h.caches.function_dependency_table().row_count().unwrap(), 0);

        // the (name, function_id) slot is free again, with a fresh row id
        let again = h
            .caches
            .insert(NewFunctionCache::new("sig", blur.row_id, "/a", CacheArgs::default()))
            .unwrap();
        assert_eq!(again.row_id, entry.row_id + 1);
    }
}
