// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! fncache - persistent function-cache catalog
//!
//! Records, for each cached user-defined function invocation, the function
//! it caches, the arguments and columns it depends on, and where the cached
//! results live, so a planner can decide whether a previous result can be
//! reused.
//!
//! # Usage
//!
//! ```ignore
//! use fncache::{CacheArg, CatalogConfig, CatalogManager, ColumnType, NewFunctionCache};
//!
//! let catalog = CatalogManager::open("./catalog", CatalogConfig::durable())?;
//! let blur = catalog.insert_function_catalog_entry("Blur", "blur.py", "Filter", "")?;
//! let frame = catalog.insert_column_catalog_entry(1, "frame", ColumnType::NdArray, false)?;
//! let entry = catalog.insert_function_cache_catalog_entry(
//!     NewFunctionCache::new(
//!         "Blur(frame)",
//!         blur.row_id,
//!         "/cache/blur",
//!         vec![CacheArg::column(frame.row_id)],
//!     )
//!     .depends_on_column(frame.row_id),
//! )?;
//! ```

pub mod catalog;
pub mod config;
pub mod storage;

pub use catalog::models::{
    bytes_checksum, file_checksum, CacheArg, CacheArgs, ColumnCatalogEntry, ColumnType,
    FunctionCacheCatalog, FunctionCacheCatalogEntry, FunctionCatalogEntry, NewFunctionCache,
};
pub use catalog::{CatalogError, CatalogManager, CatalogResult, DropSummary, TableInfo};
pub use config::{CatalogConfig, DependencyDeletePolicy};
pub use storage::{RowId, StorageType};

/// fncache version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// fncache crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
