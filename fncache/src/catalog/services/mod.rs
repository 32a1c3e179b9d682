// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog services, one per table
//!
//! Services read freely and take the storage write lock for every mutation.
//! Deletes that reach across tables are coordinated by `CatalogManager`.

pub mod association;
pub mod column;
pub mod function;
pub mod function_cache;

pub use association::JoinTableService;
pub use column::ColumnCatalogService;
pub use function::FunctionCatalogService;
pub use function_cache::FunctionCacheCatalogService;
