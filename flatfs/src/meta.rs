// SPDX-License-Identifier: MIT

use crate::{constant::*, errors::*};

/// Region layout of a container, derived from its declared size.
///
/// ```text
/// 0            fat_offset        dir_offset            data_offset
/// | header (H) | FAT (n * 4)     | directory (n * 64)  | data (n * B) ...
/// ```
///
/// `n = total_size / block_size` is both the block count and the slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatMeta {
    pub total_size: u32,
    pub block_size: u32,
    pub header_size: u32,
    pub block_count: u32,

    pub fat_offset: u64,
    pub dir_offset: u64,
    pub data_offset: u64,
}

impl FlatMeta {
    /// Layout for a container of `total_size` bytes with the default block and header sizes.
    pub fn new(total_size: u64) -> FsLayoutResult<Self> {
        Self::new_custom(total_size, FLAT_BLOCK_SIZE, FLAT_HEADER_SIZE)
    }

    pub fn new_custom(total_size: u64, block_size: u32, header_size: u32) -> FsLayoutResult<Self> {
        crate::ensure!(total_size > 0, FsLayoutError::ZeroSize);
        crate::ensure!(
            block_size.is_power_of_two(),
            FsLayoutError::UnalignedBlockSize(block_size)
        );
        let total = u32::try_from(total_size).map_err(|_| FsLayoutError::TooLarge(total_size))?;
        crate::ensure!(total >= block_size, FsLayoutError::TooSmall(total_size));

        let block_count = total / block_size;

        let fat_offset = header_size as u64;
        let dir_offset = fat_offset + block_count as u64 * FAT_ENTRY_SIZE as u64;
        let data_offset = dir_offset + block_count as u64 * DIR_ENTRY_SIZE as u64;

        // Every offset is recorded in a u32 header field.
        crate::ensure!(
            data_offset <= u32::MAX as u64,
            FsLayoutError::TooLarge(total_size)
        );

        Ok(Self {
            total_size: total,
            block_size,
            header_size,
            block_count,
            fat_offset,
            dir_offset,
            data_offset,
        })
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count as usize
    }

    #[inline]
    pub fn unit_size(&self) -> usize {
        self.block_size as usize
    }

    /// Declared container size, as recorded in the header.
    #[inline]
    pub fn size_bytes(&self) -> u64 {
        self.total_size as u64
    }

    /// Host file length needed so every block the FAT can hand out is addressable.
    #[inline]
    pub fn image_len(&self) -> u64 {
        self.data_offset + self.block_count as u64 * self.block_size as u64
    }

    #[inline]
    pub fn fat_len_bytes(&self) -> usize {
        self.block_count() * FAT_ENTRY_SIZE
    }

    #[inline]
    pub fn dir_len_bytes(&self) -> usize {
        self.block_count() * DIR_ENTRY_SIZE
    }

    #[inline]
    pub fn is_valid_block(&self, block: u32) -> bool {
        block < self.block_count
    }

    #[inline]
    pub fn fat_entry_offset(&self, block: u32) -> u64 {
        self.fat_offset + block as u64 * FAT_ENTRY_SIZE as u64
    }

    #[inline]
    pub fn dir_entry_offset(&self, slot: u32) -> u64 {
        self.dir_offset + slot as u64 * DIR_ENTRY_SIZE as u64
    }

    #[inline]
    pub fn block_offset(&self, block: u32) -> u64 {
        self.data_offset + block as u64 * self.block_size as u64
    }

    /// Number of blocks a payload of `len` bytes occupies.
    #[inline]
    pub fn blocks_for(&self, len: usize) -> usize {
        len.div_ceil(self.unit_size())
    }
}
