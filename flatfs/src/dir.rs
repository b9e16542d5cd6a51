// SPDX-License-Identifier: MIT

use alloc::{vec, vec::Vec};

use flatio::prelude::*;

use crate::{constant::*, errors::*, meta::FlatMeta, types::FlatDirEntry, utils::FlatName};

/// In-memory copy of the flat directory, one slot per block index.
///
/// Lookups scan the loaded slots; every mutation is written through to the
/// container immediately so the on-disk table stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryTable {
    slots: Vec<FlatDirEntry>,
}

impl DirectoryTable {
    /// Loads all `block_count` slots starting at the directory offset.
    pub fn read_all<IO: BlockIO + ?Sized>(io: &mut IO, meta: &FlatMeta) -> BlockIOResult<Self> {
        let mut slots = vec![FlatDirEntry::empty(); meta.block_count()];
        io.read_chunks_streamed::<DIR_ENTRY_SIZE, _>(
            meta.dir_offset,
            meta.block_count(),
            DIR_STREAM_CHUNK,
            |i, raw| slots[i] = FlatDirEntry::from_raw(raw),
        )?;
        Ok(Self { slots })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn entry(&self, slot: u32) -> Option<&FlatDirEntry> {
        self.slots.get(slot as usize)
    }

    /// Occupied slots in ascending slot order.
    pub fn scan(&self) -> impl Iterator<Item = (u32, &FlatDirEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_empty())
            .map(|(i, e)| (i as u32, e))
    }

    pub fn occupied(&self) -> usize {
        self.scan().count()
    }

    pub fn find(&self, name: &FlatName) -> FsDirectoryResult<u32> {
        self.scan()
            .find(|(_, e)| e.matches(name))
            .map(|(slot, _)| slot)
            .ok_or(FsDirectoryError::NotFound)
    }

    #[inline]
    pub fn contains(&self, name: &FlatName) -> bool {
        self.find(name).is_ok()
    }

    pub fn find_free_slot(&self) -> FsDirectoryResult<u32> {
        self.slots
            .iter()
            .position(|e| e.is_empty())
            .map(|i| i as u32)
            .ok_or(FsDirectoryError::DirectoryFull)
    }

    /// Writes `entry` into `slot`, on disk and in memory.
    pub fn write_entry<IO: BlockIO + ?Sized>(
        &mut self,
        io: &mut IO,
        meta: &FlatMeta,
        slot: u32,
        entry: FlatDirEntry,
    ) -> FsDirectoryResult {
        let target = self
            .slots
            .get_mut(slot as usize)
            .ok_or(FsDirectoryError::Other("Directory slot out of range"))?;
        io.write_struct(meta.dir_entry_offset(slot), &entry)?;
        *target = entry;
        Ok(())
    }

    /// Overwrites `slot` with 64 zero bytes.
    pub fn clear_entry<IO: BlockIO + ?Sized>(
        &mut self,
        io: &mut IO,
        meta: &FlatMeta,
        slot: u32,
    ) -> FsDirectoryResult {
        self.write_entry(io, meta, slot, FlatDirEntry::empty())
    }
}
