// SPDX-License-Identifier: MIT

use flatio::prelude::*;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::meta::FlatMeta;

/// Header position inside the container.
pub const FLAT_HEADER_OFFSET: u64 = 0;

/// Container header at offset 0: six little-endian u32 fields.
///
/// Written once by the formatter and never rewritten.
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct FlatHeader {
    total_size: u32,
    block_size: u32,
    header_size: u32,
    fat_offset: u32,
    dir_offset: u32,
    data_offset: u32,
}

const _: () = assert!(core::mem::size_of::<FlatHeader>() == 24);

impl FlatHeader {
    pub fn from_meta(meta: &FlatMeta) -> Self {
        // FlatMeta guarantees every offset fits in 32 bits.
        Self {
            total_size: meta.total_size.to_le(),
            block_size: meta.block_size.to_le(),
            header_size: meta.header_size.to_le(),
            fat_offset: (meta.fat_offset as u32).to_le(),
            dir_offset: (meta.dir_offset as u32).to_le(),
            data_offset: (meta.data_offset as u32).to_le(),
        }
    }

    #[inline]
    pub fn total_size(&self) -> u32 {
        u32::from_le(self.total_size)
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        u32::from_le(self.block_size)
    }

    #[inline]
    pub fn header_size(&self) -> u32 {
        u32::from_le(self.header_size)
    }

    #[inline]
    pub fn fat_offset(&self) -> u32 {
        u32::from_le(self.fat_offset)
    }

    #[inline]
    pub fn dir_offset(&self) -> u32 {
        u32::from_le(self.dir_offset)
    }

    #[inline]
    pub fn data_offset(&self) -> u32 {
        u32::from_le(self.data_offset)
    }

    pub fn read<IO: BlockIO + ?Sized>(io: &mut IO) -> BlockIOResult<Self> {
        io.read_struct(FLAT_HEADER_OFFSET)
    }

    pub fn write<IO: BlockIO + ?Sized>(&self, io: &mut IO) -> BlockIOResult {
        io.write_struct(FLAT_HEADER_OFFSET, self)
    }

    /// Name of the first field that disagrees with `meta`, if any.
    pub fn mismatch(&self, meta: &FlatMeta) -> Option<&'static str> {
        let expected = Self::from_meta(meta);
        let fields = [
            ("total_size", self.total_size(), expected.total_size()),
            ("block_size", self.block_size(), expected.block_size()),
            ("header_size", self.header_size(), expected.header_size()),
            ("fat_offset", self.fat_offset(), expected.fat_offset()),
            ("dir_offset", self.dir_offset(), expected.dir_offset()),
            ("data_offset", self.data_offset(), expected.data_offset()),
        ];
        fields
            .iter()
            .find(|(_, got, want)| got != want)
            .map(|(name, _, _)| *name)
    }
}
