// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog row types

pub mod args;
pub mod association;
pub mod column;
pub mod function;
pub mod function_cache;

pub use args::{CacheArg, CacheArgs};
pub use association::{DependencyRow, FunctionCacheColumnDepend, FunctionCacheFunctionDepend};
pub use column::{ColumnCatalogEntry, ColumnType};
pub use function::{bytes_checksum, file_checksum, FunctionCatalogEntry};
pub use function_cache::{FunctionCacheCatalog, FunctionCacheCatalogEntry, NewFunctionCache};
