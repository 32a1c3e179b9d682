// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Key layout for catalog trees
//!
//! Row ids are written big-endian so byte order equals numeric order.
//! Strings inside composite keys carry a big-endian u32 length prefix, which
//! keeps prefix scans exact: `"ab"` never matches keys that belong to `"abc"`.

/// Surrogate row identifier assigned by the store
pub type RowId = u64;

/// Builder for composite tree keys
#[derive(Debug, Default, Clone)]
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_id(mut self, id: RowId) -> Self {
        self.buf.extend_from_slice(&id.to_be_bytes());
        self
    }

    pub fn str(mut self, s: &str) -> Self {
        self.buf
            .extend_from_slice(&(s.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Key of a row in its table tree
pub fn row_key(id: RowId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

/// Read the row id stored at `offset` of a key or value
pub fn read_row_id(bytes: &[u8], offset: usize) -> Option<RowId> {
    let end = offset.checked_add(8)?;
    let slice = bytes.get(offset..end)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(slice);
    Some(RowId::from_be_bytes(raw))
}

/// Read the trailing row id of a composite key
pub fn trailing_row_id(key: &[u8]) -> Option<RowId> {
    key.len().checked_sub(8).and_then(|offset| read_row_id(key, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keys_sort_numerically() {
        assert!(row_key(2) < row_key(10));
        assert!(row_key(255) < row_key(256));
    }

    #[test]
    fn test_string_prefix_is_exact() {
        let short = KeyBuilder::new().str("ab").build();
        let long = KeyBuilder::new().str("abc").row_id(1).build();
        assert!(!long.starts_with(&short));

        let same = KeyBuilder::new().str("ab").row_id(7).build();
        assert!(same.starts_with(&short));
        assert_eq!(trailing_row_id(&same), Some(7));
    }

    #[test]
    fn test_read_row_id_out_of_bounds() {
        assert_eq!(read_row_id(&[0, 1, 2], 0), None);
        assert_eq!(trailing_row_id(&[]), None);
    }
}
