// SPDX-License-Identifier: MIT

use alloc::{vec, vec::Vec};

use flatio::prelude::*;

use crate::{constant::*, errors::*, meta::FlatMeta};

/// In-memory copy of the File Allocation Table.
///
/// Entry `i` describes block `i`: `FAT_FREE`, `FAT_EOC`, or the index of the
/// next block of the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatTable {
    entries: Vec<u32>,
}

impl FatTable {
    /// A table with every block free.
    pub fn new_free(meta: &FlatMeta) -> Self {
        Self {
            entries: vec![FAT_FREE; meta.block_count()],
        }
    }

    pub fn from_entries(entries: Vec<u32>) -> Self {
        Self { entries }
    }

    /// Loads all `block_count` entries starting at the FAT offset.
    pub fn read_all<IO: BlockIO + ?Sized>(io: &mut IO, meta: &FlatMeta) -> BlockIOResult<Self> {
        let mut entries = vec![FAT_FREE; meta.block_count()];
        io.read_chunks_streamed::<FAT_ENTRY_SIZE, _>(
            meta.fat_offset,
            meta.block_count(),
            FAT_STREAM_CHUNK,
            |i, raw| entries[i] = u32::from_le_bytes(*raw),
        )?;
        Ok(Self { entries })
    }

    /// Stores the whole table back, entry for entry.
    pub fn write_all<IO: BlockIO + ?Sized>(&self, io: &mut IO, meta: &FlatMeta) -> BlockIOResult {
        if self.entries.len() != meta.block_count() {
            return Err(BlockIOError::Other("FAT length does not match layout"));
        }
        io.write_chunks_streamed::<FAT_ENTRY_SIZE, _>(
            meta.fat_offset,
            self.entries.len(),
            FAT_STREAM_CHUNK,
            |i| self.entries[i].to_le_bytes(),
        )
    }

    /// Stores only the listed entries.
    pub fn write_entries<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        meta: &FlatMeta,
        blocks: &[u32],
    ) -> BlockIOResult {
        for &block in blocks {
            let value = self.get(block).ok_or(BlockIOError::OutOfBounds)?;
            io.write_u32_at(meta.fat_entry_offset(block), value)?;
        }
        Ok(())
    }

    #[inline]
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, block: u32) -> Option<u32> {
        self.entries.get(block as usize).copied()
    }

    #[inline]
    pub fn is_free(&self, block: u32) -> bool {
        self.get(block) == Some(FAT_FREE)
    }

    pub fn free_count(&self) -> usize {
        self.entries.iter().filter(|&&e| e == FAT_FREE).count()
    }

    /// First `n` free blocks in ascending index order.
    pub fn find_free(&self, n: usize) -> FsAllocatorResult<Vec<u32>> {
        let found: Vec<u32> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == FAT_FREE)
            .map(|(i, _)| i as u32)
            .take(n)
            .collect();

        if found.len() < n {
            return Err(FsAllocatorError::InsufficientSpace {
                needed: n,
                available: found.len(),
            });
        }
        Ok(found)
    }

    /// Links `blocks` in order; the last one gets `FAT_EOC`.
    pub fn allocate_chain(&mut self, blocks: &[u32]) -> FsCursorResult {
        if let Some(&bad) = blocks.iter().find(|&&b| b as usize >= self.entries.len()) {
            return Err(FsCursorError::InvalidBlock(bad));
        }
        for (i, &block) in blocks.iter().enumerate() {
            let next = blocks.get(i + 1).copied().unwrap_or(FAT_EOC);
            self.entries[block as usize] = next;
        }
        Ok(())
    }

    /// Walks a chain without modifying it.
    #[inline]
    pub fn iter_chain(&self, first: u32) -> ChainIter<'_> {
        ChainIter::new(self, first)
    }

    /// Resolves the full chain starting at `first`. `FAT_EOC` yields an empty chain.
    pub fn chain(&self, first: u32) -> FsCursorResult<Vec<u32>> {
        self.iter_chain(first).collect()
    }

    /// Releases the chain starting at `first` and returns the released blocks.
    ///
    /// The chain is resolved completely before anything is cleared, so a
    /// corrupted chain leaves the table untouched.
    pub fn free_chain(&mut self, first: u32) -> FsCursorResult<Vec<u32>> {
        let chain = self.chain(first)?;
        for &block in &chain {
            self.entries[block as usize] = FAT_FREE;
        }
        Ok(chain)
    }
}

/// Iterator over the blocks of one chain.
///
/// Stops with an error on out-of-range links, links into free blocks, and
/// chains longer than the table (a loop).
#[derive(Debug)]
pub struct ChainIter<'a> {
    fat: &'a FatTable,
    current: Option<u32>,
    seen: usize,
}

impl<'a> ChainIter<'a> {
    fn new(fat: &'a FatTable, first: u32) -> Self {
        Self {
            fat,
            current: (first != FAT_EOC).then_some(first),
            seen: 0,
        }
    }
}

impl Iterator for ChainIter<'_> {
    type Item = FsCursorResult<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.current.take()?;

        self.seen += 1;
        if self.seen > self.fat.len() {
            return Some(Err(FsCursorError::LoopDetected));
        }

        let next = match self.fat.get(block) {
            Some(next) => next,
            None => return Some(Err(FsCursorError::InvalidBlock(block))),
        };

        // Allocation hands out ascending indices, so block 0 can only head a chain.
        if next == FAT_FREE {
            return Some(Err(FsCursorError::UnlinkedBlock(block)));
        }

        if next != FAT_EOC {
            self.current = Some(next);
        }
        Some(Ok(block))
    }
}
