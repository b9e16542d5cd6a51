// SPDX-License-Identifier: MIT

use core::fmt;

use crate::{constant::FLAT_NAME_LEN, errors::*};

/// A validated file name in its on-disk form: UTF-8, null-padded to 50 bytes.
///
/// Names are never truncated: anything longer than the field is rejected so
/// two distinct host names can never collide in the directory.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FlatName {
    raw: [u8; FLAT_NAME_LEN],
    len: usize,
}

impl FlatName {
    pub fn new(name: &str) -> FsDirectoryResult<Self> {
        let bytes = name.as_bytes();
        crate::ensure!(!bytes.is_empty(), FsDirectoryError::InvalidName);
        crate::ensure!(!bytes.contains(&0), FsDirectoryError::InvalidName);
        crate::ensure!(
            bytes.len() <= FLAT_NAME_LEN,
            FsDirectoryError::NameTooLong(bytes.len())
        );

        let mut raw = [0u8; FLAT_NAME_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            raw,
            len: bytes.len(),
        })
    }

    /// Padded on-disk field.
    #[inline]
    pub fn raw(&self) -> &[u8; FLAT_NAME_LEN] {
        &self.raw
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.len]
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Built from a &str, so the prefix is valid UTF-8.
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Exact comparison against a stored field after stripping trailing padding.
    #[inline]
    pub fn matches(&self, field: &[u8; FLAT_NAME_LEN]) -> bool {
        trim_padding(field) == self.as_bytes()
    }
}

impl fmt::Debug for FlatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FlatName").field(&self.as_str()).finish()
    }
}

impl fmt::Display for FlatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored name bytes without the trailing null padding.
#[inline]
pub fn trim_padding(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &field[..end]
}
