// SPDX-License-Identifier: MIT

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::{
    attr::EntryFlags,
    constant::*,
    utils::{FlatName, name::trim_padding},
};

/// One 64-byte directory slot.
///
/// | off | len | field        |
/// |-----|-----|--------------|
/// | 0   | 50  | name         |
/// | 50  | 4   | file size    |
/// | 54  | 4   | first block  |
/// | 58  | 1   | flags        |
/// | 59  | 5   | reserved     |
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C, packed)]
pub struct FlatDirEntry {
    pub name: [u8; FLAT_NAME_LEN],
    file_size: u32,
    first_block: u32,
    pub flags: u8,
    pub reserved: [u8; DIR_RESERVED_LEN],
}

const _: () = assert!(core::mem::size_of::<FlatDirEntry>() == DIR_ENTRY_SIZE);

impl FlatDirEntry {
    /// A fresh, unprotected entry. Empty files point at `FAT_EOC`.
    pub fn new(name: &FlatName, size: u32, first_block: u32) -> Self {
        Self {
            name: *name.raw(),
            file_size: size.to_le(),
            first_block: first_block.to_le(),
            flags: EntryFlags::empty().bits(),
            reserved: [0; DIR_RESERVED_LEN],
        }
    }

    #[inline]
    pub fn empty() -> Self {
        Self::new_zeroed()
    }

    /// A slot is free iff its first byte is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name[0] == DIR_ENTRY_EMPTY
    }

    #[inline]
    pub fn name_bytes(&self) -> &[u8] {
        trim_padding(&self.name)
    }

    /// Decoded name, or `None` when the stored bytes are not UTF-8.
    #[inline]
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name_bytes()).ok()
    }

    #[inline]
    pub fn matches(&self, name: &FlatName) -> bool {
        !self.is_empty() && name.matches(&self.name)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        u32::from_le(self.file_size)
    }

    #[inline]
    pub fn first_block(&self) -> u32 {
        u32::from_le(self.first_block)
    }

    #[inline]
    pub fn attr(&self) -> EntryFlags {
        EntryFlags::from_raw(self.flags)
    }

    #[inline]
    pub fn is_protected(&self) -> bool {
        self.attr().is_protected()
    }

    #[inline]
    pub fn set_name(&mut self, name: &FlatName) {
        self.name = *name.raw();
    }

    #[inline]
    pub fn set_protected(&mut self, protected: bool) {
        let mut flags = self.attr();
        flags.set(EntryFlags::PROTECTED, protected);
        self.flags = flags.bits();
    }

    #[inline]
    pub fn to_raw(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw.copy_from_slice(self.as_bytes());
        raw
    }

    #[inline]
    pub fn from_raw(raw: &[u8; DIR_ENTRY_SIZE]) -> Self {
        // Every 64-byte pattern is a valid entry.
        Self::read_from_bytes(raw).unwrap_or_else(|_| Self::empty())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layout() {
        let name = FlatName::new("a.txt").unwrap();
        let mut entry = FlatDirEntry::new(&name, 1000, 7);
        entry.set_protected(true);
        let raw = entry.to_raw();

        assert_eq!(&raw[..5], b"a.txt");
        assert!(raw[5..50].iter().all(|&b| b == 0));
        assert_eq!(&raw[50..54], &1000u32.to_le_bytes());
        assert_eq!(&raw[54..58], &7u32.to_le_bytes());
        assert_eq!(raw[58], 1);
        assert_eq!(&raw[59..64], &[0u8; 5]);
    }

    #[test]
    fn test_from_raw_round_trips_fields() {
        let name = FlatName::new("data.bin").unwrap();
        let entry = FlatDirEntry::new(&name, 513, FAT_EOC);
        let back = FlatDirEntry::from_raw(&entry.to_raw());

        assert_eq!(back.name_str(), Some("data.bin"));
        assert_eq!(back.size(), 513);
        assert_eq!(back.first_block(), FAT_EOC);
        assert!(!back.is_protected());
    }

    #[test]
    fn test_empty_slot() {
        let entry = FlatDirEntry::empty();
        assert!(entry.is_empty());
        assert_eq!(entry.to_raw(), [0u8; DIR_ENTRY_SIZE]);
        assert!(!entry.matches(&FlatName::new("x").unwrap()));
    }

    #[test]
    fn test_protect_toggles_only_flag_byte() {
        let name = FlatName::new("keep").unwrap();
        let mut entry = FlatDirEntry::new(&name, 10, 3);
        let before = entry.to_raw();
        entry.set_protected(true);
        entry.set_protected(false);
        assert_eq!(entry.to_raw(), before);
    }
}
