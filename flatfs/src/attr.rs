// SPDX-License-Identifier: MIT

use bitflags::bitflags;

bitflags! {
    /// Flag byte of a directory entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u8 {
        /// The file rejects deletion and renaming.
        const PROTECTED = 0x01;
    }
}

impl EntryFlags {
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        Self::from_bits_truncate(raw)
    }

    #[inline]
    pub fn is_protected(&self) -> bool {
        self.contains(EntryFlags::PROTECTED)
    }
}
