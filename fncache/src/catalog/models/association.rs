// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Join tables between function caches and what they depend on
//!
//! Each dependency is an explicit row holding a foreign-key pair. Lookups in
//! either direction are queries by row id; nothing keeps back-references.

use super::column::COLUMN_TABLE;
use super::function::FUNCTION_TABLE;
use crate::storage::RowId;
use serde::{Deserialize, Serialize};

/// A row of a cache dependency join table
pub trait DependencyRow: Copy + Send + Sync {
    /// Join table name
    const TABLE: &'static str;
    /// Table the dependency side points into
    const DEPENDENCY_TABLE: &'static str;
    /// Column holding the dependency side of the pair
    const DEPENDENCY_COLUMN: &'static str;

    fn new(dependency_id: RowId, function_cache_id: RowId) -> Self;

    fn dependency_id(&self) -> RowId;

    fn function_cache_id(&self) -> RowId;
}

/// `depend_function_and_function_cache` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionCacheFunctionDepend {
    pub function_id: RowId,
    pub function_cache_id: RowId,
}

impl DependencyRow for FunctionCacheFunctionDepend {
    const TABLE: &'static str = "depend_function_and_function_cache";
    const DEPENDENCY_TABLE: &'static str = FUNCTION_TABLE;
    const DEPENDENCY_COLUMN: &'static str = "function_id";

    fn new(dependency_id: RowId, function_cache_id: RowId) -> Self {
        Self {
            function_id: dependency_id,
            function_cache_id,
        }
    }

    fn dependency_id(&self) -> RowId {
        self.function_id
    }

    fn function_cache_id(&self) -> RowId {
        self.function_cache_id
    }
}

/// `depend_column_and_function_cache` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionCacheColumnDepend {
    pub column_id: RowId,
    pub function_cache_id: RowId,
}

impl DependencyRow for FunctionCacheColumnDepend {
    const TABLE: &'static str = "depend_column_and_function_cache";
    const DEPENDENCY_TABLE: &'static str = COLUMN_TABLE;
    const DEPENDENCY_COLUMN: &'static str = "column_id";

    fn new(dependency_id: RowId, function_cache_id: RowId) -> Self {
        Self {
            column_id: dependency_id,
            function_cache_id,
        }
    }

    fn dependency_id(&self) -> RowId {
        self.column_id
    }

    fn function_cache_id(&self) -> RowId {
        self.function_cache_id
    }
}
