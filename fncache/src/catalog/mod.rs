// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function cache catalog
//!
//! Three tables and two join tables, each served by its own service:
//! - `function_catalog`: registered user-defined functions
//! - `column_catalog`: table columns a cache may read
//! - `function_cache`: materialized results of one function invocation
//! - `depend_function_and_function_cache`, `depend_column_and_function_cache`:
//!   what each cache depends on besides its owning function
//!
//! External code goes through [`CatalogManager`].

pub mod error;
pub mod manager;
pub mod models;
pub mod services;
pub mod traits;

pub use error::{CatalogError, CatalogResult};
pub use manager::{CatalogManager, DropSummary, TableInfo};
