// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Column catalog record

use crate::catalog::error::{check_width, CatalogResult};
use crate::storage::RowId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COLUMN_TABLE: &str = "column_catalog";

pub const MAX_COLUMN_NAME_LEN: usize = 100;

/// Column data types known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Text,
    NdArray,
    Any,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
            ColumnType::Text => "TEXT",
            ColumnType::NdArray => "NDARRAY",
            ColumnType::Any => "ANY",
        };
        write!(f, "{}", s)
    }
}

/// Persisted `column_catalog` row
///
/// `table_id` refers to the table catalog, which is outside this crate; it
/// is stored but not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCatalogEntry {
    pub row_id: RowId,
    pub name: String,
    pub table_id: RowId,
    pub column_type: ColumnType,
    pub is_nullable: bool,
}

impl ColumnCatalogEntry {
    pub(crate) fn check_widths(&self) -> CatalogResult<()> {
        check_width("column_catalog.name", &self.name, MAX_COLUMN_NAME_LEN)
    }
}
