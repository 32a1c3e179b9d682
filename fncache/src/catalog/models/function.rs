// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Function catalog record
//!
//! Only the parts of a user-defined function that the cache catalog relies
//! on: its identity, where its implementation lives, and a checksum of that
//! implementation.

use crate::catalog::error::{check_width, CatalogResult};
use crate::storage::RowId;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FUNCTION_TABLE: &str = "function_catalog";

pub const MAX_FUNCTION_NAME_LEN: usize = 128;
pub const MAX_IMPL_PATH_LEN: usize = 128;
pub const MAX_FUNCTION_TYPE_LEN: usize = 128;
pub const MAX_CHECKSUM_LEN: usize = 512;

/// Persisted `function_catalog` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCatalogEntry {
    pub row_id: RowId,
    pub name: String,
    pub impl_file_path: String,
    pub function_type: String,
    pub checksum: String,
}

impl FunctionCatalogEntry {
    pub(crate) fn check_widths(&self) -> CatalogResult<()> {
        check_width("function_catalog.name", &self.name, MAX_FUNCTION_NAME_LEN)?;
        check_width(
            "function_catalog.impl_file_path",
            &self.impl_file_path,
            MAX_IMPL_PATH_LEN,
        )?;
        check_width(
            "function_catalog.type",
            &self.function_type,
            MAX_FUNCTION_TYPE_LEN,
        )?;
        check_width("function_catalog.checksum", &self.checksum, MAX_CHECKSUM_LEN)
    }
}

/// CRC32 of the implementation file, as lowercase hex
pub fn file_checksum<P: AsRef<Path>>(path: P) -> CatalogResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(bytes_checksum(&bytes))
}

pub fn bytes_checksum(bytes: &[u8]) -> String {
    format!("{:08x}", crc32fast::hash(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_checksum_tracks_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"def blur(frame): ...").unwrap();

        let first = file_checksum(file.path()).unwrap();
        assert_eq!(first, bytes_checksum(b"def blur(frame): ..."));
        assert_eq!(first.len(), 8);

        file.write_all(b"\n# changed").unwrap();
        assert_ne!(file_checksum(file.path()).unwrap(), first);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            file_checksum(temp_dir.path().join("absent.py")),
            Err(crate::catalog::error::CatalogError::IoError(_))
        ));
    }
}
