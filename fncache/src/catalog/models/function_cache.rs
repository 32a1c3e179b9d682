// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function cache catalog record
//!
//! A `FunctionCacheCatalog` row records, for one cached user-defined
//! function invocation:
//! - `row_id`: assigned by the store on insert, immutable
//! - `name`: the function signature the cache is built for; unique per function
//! - `function_id`: row id of the owning function (deleting it deletes the cache)
//! - `cache_path`: where the materialized results live
//! - `args`: the encoded argument list (see [`CacheArgs`])
//!
//! The function and column dependencies are not part of the row; they live
//! in the join tables and are supplied when the row is turned into a
//! [`FunctionCacheCatalogEntry`].

use super::args::CacheArgs;
use crate::catalog::error::{check_width, CatalogError, CatalogResult};
use crate::storage::RowId;
use serde::{Deserialize, Serialize};

pub const FUNCTION_CACHE_TABLE: &str = "function_cache";

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_CACHE_PATH_LEN: usize = 256;
pub const MAX_ARGS_LEN: usize = 1024;

/// Persisted `function_cache` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCacheCatalog {
    row_id: Option<RowId>,
    name: String,
    function_id: RowId,
    cache_path: String,
    args: String,
}

impl FunctionCacheCatalog {
    /// Build a row; the arguments are stored in their encoded form
    pub fn new(
        name: impl Into<String>,
        function_id: RowId,
        cache_path: impl Into<String>,
        args: &CacheArgs,
    ) -> CatalogResult<Self> {
        let row = Self {
            row_id: None,
            name: name.into(),
            function_id,
            cache_path: cache_path.into(),
            args: args.encode()?,
        };
        row.check_widths()?;
        Ok(row)
    }

    fn check_widths(&self) -> CatalogResult<()> {
        check_width("function_cache.name", &self.name, MAX_NAME_LEN)?;
        check_width("function_cache.cache_path", &self.cache_path, MAX_CACHE_PATH_LEN)?;
        check_width("function_cache.args", &self.args, MAX_ARGS_LEN)
    }

    pub(crate) fn assign_row_id(&mut self, row_id: RowId) {
        self.row_id = Some(row_id);
    }

    pub fn row_id(&self) -> Option<RowId> {
        self.row_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function_id(&self) -> RowId {
        self.function_id
    }

    pub fn cache_path(&self) -> &str {
        &self.cache_path
    }

    /// The `args` column exactly as stored
    pub fn encoded_args(&self) -> &str {
        &self.args
    }

    /// Snapshot the row as a plain record
    ///
    /// Dependency ids are reported in ascending order. Fails with
    /// `MalformedEncoding` if the stored args no longer decode, and with
    /// `EntityNotFound` for a row that was never persisted.
    pub fn as_entry(
        &self,
        mut function_depends: Vec<RowId>,
        mut col_depends: Vec<RowId>,
    ) -> CatalogResult<FunctionCacheCatalogEntry> {
        let row_id = self.row_id.ok_or_else(|| {
            CatalogError::EntityNotFound(format!(
                "function cache '{}' has not been persisted",
                self.name
            ))
        })?;
        function_depends.sort_unstable();
        function_depends.dedup();
        col_depends.sort_unstable();
        col_depends.dedup();

        Ok(FunctionCacheCatalogEntry {
            row_id,
            name: self.name.clone(),
            function_id: self.function_id,
            cache_path: self.cache_path.clone(),
            args: CacheArgs::decode(&self.args)?,
            function_depends,
            col_depends,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_raw_args(mut self, raw: &str) -> Self {
        self.args = raw.to_string();
        self
    }
}

/// Immutable snapshot of a function cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCacheCatalogEntry {
    pub row_id: RowId,
    pub name: String,
    pub function_id: RowId,
    pub cache_path: String,
    pub args: CacheArgs,
    pub function_depends: Vec<RowId>,
    pub col_depends: Vec<RowId>,
}

/// Insert request for a function cache entry, with its initial dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFunctionCache {
    pub name: String,
    pub function_id: RowId,
    pub cache_path: String,
    pub args: CacheArgs,
    pub function_depends: Vec<RowId>,
    pub col_depends: Vec<RowId>,
}

impl NewFunctionCache {
    pub fn new(
        name: impl Into<String>,
        function_id: RowId,
        cache_path: impl Into<String>,
        args: impl Into<CacheArgs>,
    ) -> Self {
        Self {
            name: name.into(),
            function_id,
            cache_path: cache_path.into(),
            args: args.into(),
            function_depends: Vec::new(),
            col_depends: Vec::new(),
        }
    }

    pub fn depends_on_function(mut self, function_id: RowId) -> Self {
        self.function_depends.push(function_id);
        self
    }

    pub fn depends_on_column(mut self, column_id: RowId) -> Self {
        self.col_depends.push(column_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::args::CacheArg;

    #[test]
    fn test_construct_and_snapshot() {
        let args = CacheArgs::new(vec![CacheArg::column(3)]);
        let mut row =
            FunctionCacheCatalog::new("sig_blur(col3)", 7, "/cache/blur_7.bin", &args).unwrap();
        row.assign_row_id(1);

        let entry = row.as_entry(vec![], vec![]).unwrap();
        assert_eq!(entry.row_id, 1);
        assert_eq!(entry.name, "sig_blur(col3)");
        assert_eq!(entry.function_id, 7);
        assert_eq!(entry.cache_path, "/cache/blur_7.bin");
        assert_eq!(entry.args, args);
        assert!(entry.function_depends.is_empty());
        assert!(entry.col_depends.is_empty());
    }

    #[test]
    fn test_args_stored_encoded() {
        let args = CacheArgs::new(vec![CacheArg::column(3), CacheArg::expression("Area(bbox)")]);
        let row = FunctionCacheCatalog::new("sig", 1, "/c", &args).unwrap();
        assert_eq!(row.encoded_args(), args.encode().unwrap());
    }

    #[test]
    fn test_dependencies_sorted_and_deduplicated() {
        let mut row = FunctionCacheCatalog::new("sig", 1, "/c", &CacheArgs::default()).unwrap();
        row.assign_row_id(4);
        let entry = row.as_entry(vec![9, 2, 9], vec![5, 1]).unwrap();
        assert_eq!(entry.function_depends, vec![2, 9]);
        assert_eq!(entry.col_depends, vec![1, 5]);
    }

    #[test]
    fn test_corrupt_args_surface_as_malformed_encoding() {
        let mut row = FunctionCacheCatalog::new("sig", 1, "/c", &CacheArgs::default())
            .unwrap()
            .with_raw_args("not a tuple");
        row.assign_row_id(1);
        assert!(matches!(
            row.as_entry(vec![], vec![]),
            Err(CatalogError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_unpersisted_row_has_no_snapshot() {
        let row = FunctionCacheCatalog::new("sig", 1, "/c", &CacheArgs::default()).unwrap();
        assert!(matches!(
            row.as_entry(vec![], vec![]),
            Err(CatalogError::EntityNotFound(_))
        ));
    }

    #[test]
    fn test_column_widths_enforced() {
        let long_name = "n".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            FunctionCacheCatalog::new(long_name, 1, "/c", &CacheArgs::default()),
            Err(CatalogError::ValueTooLong { max: MAX_NAME_LEN, .. })
        ));

        let long_path = "p".repeat(MAX_CACHE_PATH_LEN + 1);
        assert!(matches!(
            FunctionCacheCatalog::new("sig", 1, long_path, &CacheArgs::default()),
            Err(CatalogError::ValueTooLong { max: MAX_CACHE_PATH_LEN, .. })
        ));

        let wide_args = CacheArgs::new(vec![CacheArg::expression("x".repeat(MAX_ARGS_LEN))]);
        assert!(matches!(
            FunctionCacheCatalog::new("sig", 1, "/c", &wide_args),
            Err(CatalogError::ValueTooLong { max: MAX_ARGS_LEN, .. })
        ));

        let exact = "n".repeat(MAX_NAME_LEN);
        assert!(FunctionCacheCatalog::new(exact, 1, "/c", &CacheArgs::default()).is_ok());
    }
}
