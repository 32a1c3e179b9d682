// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function cache argument descriptors
//!
//! Each argument of a cached function call is either a column of the
//! catalog (by row id) or an expression, kept as its textual form. The
//! ordered list is stored in the `args` column as JSON, e.g.
//!
//! ```text
//! [{"kind":"column","value":3},{"kind":"expression","value":"Area(bbox)"}]
//! ```

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::storage::RowId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One argument of a cached function invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CacheArg {
    /// Row id of a column in the column catalog
    #[serde(rename = "column")]
    ColumnReference(RowId),
    /// Textual form of a (function) expression tree
    Expression(String),
}

impl CacheArg {
    pub fn column(id: RowId) -> Self {
        CacheArg::ColumnReference(id)
    }

    pub fn expression(text: impl Into<String>) -> Self {
        CacheArg::Expression(text.into())
    }

    /// Column row id, if this argument references a column
    pub fn column_id(&self) -> Option<RowId> {
        match self {
            CacheArg::ColumnReference(id) => Some(*id),
            CacheArg::Expression(_) => None,
        }
    }
}

impl fmt::Display for CacheArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheArg::ColumnReference(id) => write!(f, "col#{}", id),
            CacheArg::Expression(text) => write!(f, "{}", text),
        }
    }
}

/// Ordered argument list of a function cache entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheArgs(Vec<CacheArg>);

impl CacheArgs {
    pub fn new(args: Vec<CacheArg>) -> Self {
        Self(args)
    }

    /// Encode for the `args` column
    pub fn encode(&self) -> CatalogResult<String> {
        serde_json::to_string(self).map_err(|e| CatalogError::SerializationError(e.to_string()))
    }

    /// Decode the `args` column
    ///
    /// Anything other than a well-formed argument list is storage corruption
    /// and is reported as `MalformedEncoding`.
    pub fn decode(encoded: &str) -> CatalogResult<Self> {
        serde_json::from_str(encoded).map_err(|e| {
            CatalogError::MalformedEncoding(format!("invalid args {:?}: {}", encoded, e))
        })
    }

    pub fn as_slice(&self) -> &[CacheArg] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CacheArg> {
        self.0.iter()
    }

    /// Row ids of the columns referenced by these arguments, in order
    pub fn column_ids(&self) -> Vec<RowId> {
        self.0.iter().filter_map(CacheArg::column_id).collect()
    }

    pub fn into_inner(self) -> Vec<CacheArg> {
        self.0
    }
}

impl From<Vec<CacheArg>> for CacheArgs {
    fn from(args: Vec<CacheArg>) -> Self {
        Self(args)
    }
}

impl FromIterator<CacheArg> for CacheArgs {
    fn from_iter<I: IntoIterator<Item = CacheArg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CacheArgs {
    type Item = &'a CacheArg;
    type IntoIter = std::slice::Iter<'a, CacheArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CacheArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}
