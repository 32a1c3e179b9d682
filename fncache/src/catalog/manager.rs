// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Unified catalog manager - The single external interface
//!
//! `CatalogManager` owns the storage manager and the per-table services and
//! is the only place where a mutation reaches across tables: deleting a
//! function or a column, and repairing dangling join rows.

use super::error::{CatalogError, CatalogResult};
use super::models::{
    file_checksum, ColumnCatalogEntry, ColumnType, DependencyRow, FunctionCacheCatalogEntry,
    FunctionCatalogEntry, NewFunctionCache,
};
use super::services::{ColumnCatalogService, FunctionCacheCatalogService, FunctionCatalogService};
use super::traits::{CatalogSchema, CatalogTable};
use crate::config::{CatalogConfig, DependencyDeletePolicy};
use crate::storage::{RowId, StorageManager};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// Schema and size of one catalog table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: CatalogSchema,
    pub row_count: usize,
}

/// Caches touched by a function or column delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSummary {
    /// Caches deleted, ascending
    pub deleted_caches: Vec<RowId>,
    /// Caches that survived but lost a dependency, ascending
    pub detached_caches: Vec<RowId>,
}

/// Unified catalog manager
pub struct CatalogManager {
    storage: Arc<StorageManager>,
    config: CatalogConfig,
    functions: Arc<FunctionCatalogService>,
    columns: Arc<ColumnCatalogService>,
    function_caches: FunctionCacheCatalogService,
}

impl CatalogManager {
    /// Create a catalog manager over an already opened store
    ///
    /// # Arguments
    /// * `storage` - Shared storage manager
    /// * `config` - Catalog configuration; only the delete policy is read here
    pub fn new(storage: Arc<StorageManager>, config: CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        let functions = Arc::new(FunctionCatalogService::new(storage.clone())?);
        let columns = Arc::new(ColumnCatalogService::new(storage.clone())?);
        let function_caches =
            FunctionCacheCatalogService::new(storage.clone(), functions.clone(), columns.clone())?;

        Ok(Self {
            storage,
            config,
            functions,
            columns,
            function_caches,
        })
    }

    /// Open (or create) a catalog at `path`
    pub fn open<P: AsRef<Path>>(path: P, config: CatalogConfig) -> CatalogResult<Self> {
        let storage = StorageManager::new(path, config.storage_type, config.flush_on_write)?;
        Self::new(Arc::new(storage), config)
    }

    /// Volatile catalog with the default delete policy
    pub fn in_memory() -> CatalogResult<Self> {
        Self::open("", CatalogConfig::in_memory())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn functions(&self) -> &FunctionCatalogService {
        &self.functions
    }

    pub fn columns(&self) -> &ColumnCatalogService {
        &self.columns
    }

    pub fn function_caches(&self) -> &FunctionCacheCatalogService {
        &self.function_caches
    }

    // ---- function_catalog ----

    pub fn insert_function_catalog_entry(
        &self,
        name: &str,
        impl_file_path: &str,
        function_type: &str,
        checksum: &str,
    ) -> CatalogResult<FunctionCatalogEntry> {
        self.functions
            .insert(name, impl_file_path, function_type, checksum)
    }

    /// Register a function, checksumming its implementation file
    pub fn register_function_file<P: AsRef<Path>>(
        &self,
        name: &str,
        impl_file_path: P,
        function_type: &str,
    ) -> CatalogResult<FunctionCatalogEntry> {
        let path = impl_file_path.as_ref();
        let checksum = file_checksum(path)?;
        self.functions
            .insert(name, &path.to_string_lossy(), function_type, &checksum)
    }

    pub fn get_function_catalog_entry_by_name(
        &self,
        name: &str,
    ) -> CatalogResult<Option<FunctionCatalogEntry>> {
        self.functions.get_by_name(name)
    }

    /// Delete a function using the configured dependency policy
    ///
    /// Returns `None` if no function has that name.
    pub fn drop_function_catalog_entry_by_name(
        &self,
        name: &str,
    ) -> CatalogResult<Option<DropSummary>> {
        self.drop_function_with_policy(name, self.config.dependency_delete_policy)
    }

    /// Delete a function, the caches it owns and its join rows
    ///
    /// Caches that only depend on the function are detached or deleted
    /// according to `policy`.
    pub fn drop_function_with_policy(
        &self,
        name: &str,
        policy: DependencyDeletePolicy,
    ) -> CatalogResult<Option<DropSummary>> {
        let _guard = self.storage.lock_writes();
        let Some(function) = self.functions.get_by_name(name)? else {
            return Ok(None);
        };

        let mut deleted = BTreeSet::new();
        for cache_id in self.function_caches.ids_by_function(function.row_id)? {
            if self.function_caches.delete(cache_id)? {
                deleted.insert(cache_id);
            }
        }
        let dependents = self.function_caches.detach_function(function.row_id)?;
        let summary = self.settle_dependents(dependents, policy, deleted)?;

        self.functions.remove(&function)?;
        self.storage.commit()?;

        info!(
            "Dropped function '{}' (row {}): {} caches deleted, {} detached",
            function.name,
            function.row_id,
            summary.deleted_caches.len(),
            summary.detached_caches.len()
        );
        Ok(Some(summary))
    }

    fn settle_dependents(
        &self,
        dependents: Vec<RowId>,
        policy: DependencyDeletePolicy,
        mut deleted: BTreeSet<RowId>,
    ) -> CatalogResult<DropSummary> {
        let mut detached = BTreeSet::new();
        for cache_id in dependents {
            match policy {
                DependencyDeletePolicy::Cascade => {
                    if self.function_caches.delete(cache_id)? {
                        deleted.insert(cache_id);
                    }
                }
                DependencyDeletePolicy::Detach => {
                    detached.insert(cache_id);
                }
            }
        }
        Ok(DropSummary {
            deleted_caches: deleted.into_iter().collect(),
            detached_caches: detached.into_iter().collect(),
        })
    }

    // ---- column_catalog ----

    pub fn insert_column_catalog_entry(
        &self,
        table_id: RowId,
        name: &str,
        column_type: ColumnType,
        is_nullable: bool,
    ) -> CatalogResult<ColumnCatalogEntry> {
        self.columns.insert(table_id, name, column_type, is_nullable)
    }

    pub fn get_column_catalog_entry(
        &self,
        table_id: RowId,
        name: &str,
    ) -> CatalogResult<Option<ColumnCatalogEntry>> {
        self.columns.get_by_name(table_id, name)
    }

    /// Delete a column and the join rows naming it
    ///
    /// Returns `None` if the column does not exist.
    pub fn drop_column_catalog_entry(&self, row_id: RowId) -> CatalogResult<Option<DropSummary>> {
        let _guard = self.storage.lock_writes();
        let Some(column) = self.columns.remove(row_id)? else {
            return Ok(None);
        };
        let dependents = self.function_caches.detach_column(row_id)?;
        let summary = self.settle_dependents(
            dependents,
            self.config.dependency_delete_policy,
            BTreeSet::new(),
        )?;
        self.storage.commit()?;

        info!(
            "Dropped column '{}' (row {}): {} caches deleted, {} detached",
            column.name,
            row_id,
            summary.deleted_caches.len(),
            summary.detached_caches.len()
        );
        Ok(Some(summary))
    }

    // ---- function_cache ----

    pub fn insert_function_cache_catalog_entry(
        &self,
        new: NewFunctionCache,
    ) -> CatalogResult<FunctionCacheCatalogEntry> {
        self.function_caches.insert(new)
    }

    pub fn get_function_cache_catalog_entry_by_name(
        &self,
        name: &str,
    ) -> CatalogResult<Option<FunctionCacheCatalogEntry>> {
        self.function_caches.get_by_name(name)
    }

    /// Look a cache up by its name and the name of its owning function
    pub fn get_function_cache_for_function(
        &self,
        name: &str,
        function_name: &str,
    ) -> CatalogResult<Option<FunctionCacheCatalogEntry>> {
        let function = self.functions.get_by_name(function_name)?.ok_or_else(|| {
            CatalogError::EntityNotFound(format!("function '{}'", function_name))
        })?;
        self.function_caches
            .get_by_name_and_function(name, function.row_id)
    }

    pub fn drop_function_cache_catalog_entry(&self, row_id: RowId) -> CatalogResult<bool> {
        self.function_caches.delete(row_id)
    }

    // ---- maintenance ----

    /// Remove rows left dangling by an interrupted cascade
    ///
    /// Deletes caches whose owning function is gone, fixes the
    /// `function_cache` index entries that disagree with the rows, and drops
    /// join rows naming a missing cache, function or column. Returns how many
    /// rows and index entries were changed.
    pub fn repair(&self) -> CatalogResult<usize> {
        let _guard = self.storage.lock_writes();
        let mut removed = 0;

        // rows are read without decoding args so corrupt entries do not stop the pass
        for (row_id, row) in self.function_caches.raw_rows()? {
            if !self.functions.exists(row.function_id())? {
                warn!(
                    "Function cache '{}' (row {}) references missing function {}; deleting",
                    row.name(),
                    row_id,
                    row.function_id()
                );
                if self.function_caches.delete(row_id)? {
                    removed += 1;
                }
            }
        }

        removed += self.function_caches.repair_indexes()?;

        for row in self.function_caches.function_dependency_table().rows()? {
            if self.function_caches.get_row(row.function_cache_id())?.is_none() {
                warn!(
                    "Join row ({}, {}) names missing function cache; removing",
                    row.dependency_id(),
                    row.function_cache_id()
                );
                removed += self
                    .function_caches
                    .function_dependency_table()
                    .remove_cache(row.function_cache_id())?;
            } else if !self.functions.exists(row.dependency_id())? {
                warn!(
                    "Join row ({}, {}) names missing function; removing",
                    row.dependency_id(),
                    row.function_cache_id()
                );
                removed += self
                    .function_caches
                    .detach_function(row.dependency_id())?
                    .len();
            }
        }

        for row in self.function_caches.column_dependency_table().rows()? {
            if self.function_caches.get_row(row.function_cache_id())?.is_none() {
                warn!(
                    "Join row ({}, {}) names missing function cache; removing",
                    row.dependency_id(),
                    row.function_cache_id()
                );
                removed += self
                    .function_caches
                    .column_dependency_table()
                    .remove_cache(row.function_cache_id())?;
            } else if !self.columns.exists(row.dependency_id())? {
                warn!(
                    "Join row ({}, {}) names missing column; removing",
                    row.dependency_id(),
                    row.function_cache_id()
                );
                removed += self.function_caches.detach_column(row.dependency_id())?.len();
            }
        }

        if removed > 0 {
            self.storage.commit()?;
            info!("Catalog repair changed {} rows", removed);
        }
        Ok(removed)
    }

    /// Every catalog table with its schema and row count
    pub fn list_tables(&self) -> CatalogResult<Vec<TableInfo>> {
        let tables: [&dyn CatalogTable; 5] = [
            &*self.functions,
            &*self.columns,
            &self.function_caches,
            self.function_caches.function_dependency_table(),
            self.function_caches.column_dependency_table(),
        ];
        tables
            .into_iter()
            .map(|table| {
                Ok(TableInfo {
                    schema: table.schema(),
                    row_count: table.row_count()?,
                })
            })
            .collect()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> CatalogResult<()> {
        Ok(self.storage.flush()?)
    }
}
