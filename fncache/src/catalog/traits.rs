// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog table trait definition
//!
//! Every catalog service implements [`CatalogTable`] so the manager can
//! describe the catalog without knowing the concrete services.

use super::error::CatalogResult;
use serde::{Deserialize, Serialize};

/// Column description for a catalog table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// Storage type, e.g. `INTEGER` or `VARCHAR(128)`
    pub data_type: String,
    /// `table.column` this column references, if any
    pub references: Option<String>,
    /// Whether deleting the referenced row deletes this one
    pub on_delete_cascade: bool,
}

impl ColumnSchema {
    pub fn integer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: "INTEGER".to_string(),
            references: None,
            on_delete_cascade: false,
        }
    }

    pub fn varchar(name: &str, len: usize) -> Self {
        Self {
            name: name.to_string(),
            data_type: format!("VARCHAR({})", len),
            references: None,
            on_delete_cascade: false,
        }
    }

    pub fn other(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            references: None,
            on_delete_cascade: false,
        }
    }

    pub fn references(mut self, target: &str, on_delete_cascade: bool) -> Self {
        self.references = Some(target.to_string());
        self.on_delete_cascade = on_delete_cascade;
        self
    }
}

/// Schema information for a catalog table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSchema {
    /// Table name
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnSchema>,
    /// Unique constraints, each a list of column names
    pub unique: Vec<Vec<String>>,
}

/// Core trait implemented by every catalog table service
pub trait CatalogTable: Send + Sync {
    /// Describe the table
    fn schema(&self) -> CatalogSchema;

    /// Number of rows currently stored
    fn row_count(&self) -> CatalogResult<usize>;
}
