// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Join table service for cache dependencies
//!
//! Each join table is stored twice: keyed `(dependency_id, cache_id)` for
//! "which caches depend on X" and keyed `(cache_id, dependency_id)` for
//! "what does cache Y depend on". Both trees are written together under the
//! catalog write lock.

use crate::catalog::error::CatalogResult;
use crate::catalog::models::function_cache::FUNCTION_CACHE_TABLE;
use crate::catalog::models::DependencyRow;
use crate::catalog::traits::{CatalogSchema, CatalogTable, ColumnSchema};
use crate::storage::keys::{read_row_id, KeyBuilder, RowId};
use crate::storage::{StorageManager, StorageTree};
use log::debug;
use std::marker::PhantomData;

pub struct JoinTableService<R: DependencyRow> {
    by_dependency: Box<dyn StorageTree>,
    by_cache: Box<dyn StorageTree>,
    _row: PhantomData<fn() -> R>,
}

impl<R: DependencyRow> JoinTableService<R> {
    pub fn new(storage: &StorageManager) -> CatalogResult<Self> {
        Ok(Self {
            by_dependency: storage.open_tree(R::TABLE)?,
            by_cache: storage.open_tree(&format!("{}.by_cache", R::TABLE))?,
            _row: PhantomData,
        })
    }

    fn dependency_key(row: &R) -> Vec<u8> {
        KeyBuilder::new()
            .row_id(row.dependency_id())
            .row_id(row.function_cache_id())
            .build()
    }

    fn cache_key(row: &R) -> Vec<u8> {
        KeyBuilder::new()
            .row_id(row.function_cache_id())
            .row_id(row.dependency_id())
            .build()
    }

    /// Insert a pair; returns false if it was already present
    pub fn insert(&self, row: R) -> CatalogResult<bool> {
        let key = Self::dependency_key(&row);
        if self.by_dependency.contains_key(&key)? {
            return Ok(false);
        }
        self.by_dependency.insert(&key, &[])?;
        self.by_cache.insert(&Self::cache_key(&row), &[])?;
        debug!(
            "{}: cache {} now depends on {} {}",
            R::TABLE,
            row.function_cache_id(),
            R::DEPENDENCY_COLUMN,
            row.dependency_id()
        );
        Ok(true)
    }

    pub fn contains(&self, row: R) -> CatalogResult<bool> {
        Ok(self.by_dependency.contains_key(&Self::dependency_key(&row))?)
    }

    /// Dependency ids of one cache, ascending
    pub fn dependencies_of(&self, function_cache_id: RowId) -> CatalogResult<Vec<RowId>> {
        Self::second_ids(&self.by_cache, function_cache_id)
    }

    /// Cache ids depending on one dependency, ascending
    pub fn caches_depending_on(&self, dependency_id: RowId) -> CatalogResult<Vec<RowId>> {
        Self::second_ids(&self.by_dependency, dependency_id)
    }

    fn second_ids(tree: &dyn StorageTree, first: RowId) -> CatalogResult<Vec<RowId>> {
        let prefix = KeyBuilder::new().row_id(first).build();
        let mut ids = Vec::new();
        for item in tree.scan_prefix(&prefix)? {
            let (key, _) = item?;
            if let Some(id) = read_row_id(&key, 8) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Drop every pair naming the cache; returns how many were removed
    pub fn remove_cache(&self, function_cache_id: RowId) -> CatalogResult<usize> {
        let dependencies = self.dependencies_of(function_cache_id)?;
        self.remove_pairs(
            dependencies
                .iter()
                .map(|dep| R::new(*dep, function_cache_id)),
        )?;
        Ok(dependencies.len())
    }

    /// Drop every pair naming the dependency; returns the affected cache ids
    pub fn remove_dependency(&self, dependency_id: RowId) -> CatalogResult<Vec<RowId>> {
        let caches = self.caches_depending_on(dependency_id)?;
        self.remove_pairs(caches.iter().map(|cache| R::new(dependency_id, *cache)))?;
        Ok(caches)
    }

    fn remove_pairs(&self, rows: impl Iterator<Item = R>) -> CatalogResult<()> {
        let (dep_keys, cache_keys): (Vec<Vec<u8>>, Vec<Vec<u8>>) = rows
            .map(|row| (Self::dependency_key(&row), Self::cache_key(&row)))
            .unzip();
        let dep_refs: Vec<&[u8]> = dep_keys.iter().map(Vec::as_slice).collect();
        let cache_refs: Vec<&[u8]> = cache_keys.iter().map(Vec::as_slice).collect();
        self.by_dependency.batch_remove(&dep_refs)?;
        self.by_cache.batch_remove(&cache_refs)?;
        Ok(())
    }

    /// All pairs, ordered by dependency id
    pub fn rows(&self) -> CatalogResult<Vec<R>> {
        let mut rows = Vec::new();
        for item in self.by_dependency.iter()? {
            let (key, _) = item?;
            if let (Some(dep), Some(cache)) = (read_row_id(&key, 0), read_row_id(&key, 8)) {
                rows.push(R::new(dep, cache));
            }
        }
        Ok(rows)
    }
}

impl<R: DependencyRow> CatalogTable for JoinTableService<R> {
    fn schema(&self) -> CatalogSchema {
        CatalogSchema {
            name: R::TABLE.to_string(),
            columns: vec![
                ColumnSchema::integer(R::DEPENDENCY_COLUMN)
                    .references(&format!("{}._row_id", R::DEPENDENCY_TABLE), false),
                ColumnSchema::integer("function_cache_id")
                    .references(&format!("{}._row_id", FUNCTION_CACHE_TABLE), false),
            ],
            unique: vec![vec![
                R::DEPENDENCY_COLUMN.to_string(),
                "function_cache_id".to_string(),
            ]],
        }
    }

    fn row_count(&self) -> CatalogResult<usize> {
        Ok(self.rows()?.len())
    }
}
