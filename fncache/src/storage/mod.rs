// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog storage
//!
//! This module provides:
//! - Pluggable ordered key-value drivers (sled, in-memory)
//! - Key layout helpers for rows, indexes and join tables
//! - The StorageManager shared by all catalog services

pub mod keys;
mod persistent;
pub mod storage_manager;

pub use keys::RowId;
pub use persistent::{StorageDriverError, StorageResult, StorageTree, StorageType};
pub use storage_manager::StorageManager;
