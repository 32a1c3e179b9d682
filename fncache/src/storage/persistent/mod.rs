// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! Trait-based abstractions for ordered key-value storage, so the catalog
//! can run on sled or entirely in memory.
//!
//! # Architecture
//!
//! ```text
//! Catalog services (rows, indexes, join tables)
//!     ↓
//! StorageManager (row ids, row encoding, write lock)
//!     ↓
//! StorageDriver (key-value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```

pub mod factory;
pub mod traits;
pub mod types;

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use factory::{create_storage_driver, DynStorageDriver};
pub use traits::StorageTree;
pub use types::{StorageDriverError, StorageResult, StorageType};
