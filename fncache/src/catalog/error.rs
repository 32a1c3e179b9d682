// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog

use crate::storage::RowId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A row with the same unique key already exists
    #[error("Uniqueness violation on {table}: {key} already exists")]
    UniquenessViolation { table: String, key: String },

    /// Stored argument list could not be decoded; the row is corrupt
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A referenced row does not exist
    #[error("Foreign key violation: {table}.{column} references missing row {row_id}")]
    ForeignKeyViolation {
        table: String,
        column: String,
        row_id: RowId,
    },

    #[error("Value too long for column {column}: {actual} bytes (max {max})")]
    ValueTooLong {
        column: String,
        max: usize,
        actual: usize,
    },

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Ambiguous name: {0}")]
    AmbiguousName(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for CatalogError {
    fn from(err: bincode::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

impl From<crate::storage::StorageDriverError> for CatalogError {
    fn from(err: crate::storage::StorageDriverError) -> Self {
        CatalogError::StorageError(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Reject values wider than their column
pub(crate) fn check_width(column: &str, value: &str, max: usize) -> CatalogResult<()> {
    if value.len() > max {
        return Err(CatalogError::ValueTooLong {
            column: column.to_string(),
            max,
            actual: value.len(),
        });
    }
    Ok(())
}
