// SPDX-License-Identifier: MIT

use alloc::{string::String, vec::Vec};

use flatio::prelude::*;

use crate::{
    constant::*,
    dir::DirectoryTable,
    errors::*,
    fat::FatTable,
    meta::FlatMeta,
    store::BlockStore,
    types::{FlatDirEntry, FlatHeader},
    utils::FlatName,
};

/// Metadata of one stored file, as reported by listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub slot: u32,
    pub name: String,
    pub size: u32,
    pub first_block: u32,
    pub protected: bool,
}

impl FileEntry {
    fn from_slot(slot: u32, entry: &FlatDirEntry) -> Self {
        Self {
            slot,
            name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
            size: entry.size(),
            first_block: entry.first_block(),
            protected: entry.is_protected(),
        }
    }

    /// `true` for zero-length files, which own no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first_block == FAT_EOC
    }
}

/// File operations over an already formatted container.
///
/// Each call reloads the FAT and directory it needs from `io`, mutates them,
/// and writes the touched entries back before returning. Nothing is cached
/// between calls.
pub struct Volume<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a FlatMeta,
}

impl<'a, IO: BlockIO + ?Sized> Volume<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a FlatMeta) -> Self {
        Self { io, meta }
    }

    #[inline]
    pub fn meta(&self) -> &FlatMeta {
        self.meta
    }

    pub fn read_header(&mut self) -> FsResult<FlatHeader> {
        Ok(FlatHeader::read(self.io)?)
    }

    /// Fails with `HeaderMismatch` if the stored header disagrees with the layout.
    pub fn validate_header(&mut self) -> FsResult {
        let header = self.read_header()?;
        if let Some(field) = header.mismatch(self.meta) {
            return Err(FsError::HeaderMismatch(field));
        }
        Ok(())
    }

    pub fn fat(&mut self) -> FsResult<FatTable> {
        Ok(FatTable::read_all(self.io, self.meta)?)
    }

    pub fn directory(&mut self) -> FsResult<DirectoryTable> {
        Ok(DirectoryTable::read_all(self.io, self.meta)?)
    }

    /// Stores `data` as a new file called `name`.
    ///
    /// Name, slot and space are all checked before the first write, so a
    /// rejected import leaves the container untouched.
    pub fn import(&mut self, name: &str, data: &[u8]) -> FsResult<FileEntry> {
        let name = FlatName::new(name)?;
        let size = u32::try_from(data.len()).map_err(|_| FsAllocatorError::InsufficientSpace {
            needed: self.meta.blocks_for(data.len()),
            available: 0,
        })?;

        let mut dir = self.directory()?;
        crate::ensure!(!dir.contains(&name), FsDirectoryError::AlreadyExists);
        let slot = dir.find_free_slot()?;

        let mut fat = self.fat()?;
        let blocks = fat.find_free(self.meta.blocks_for(data.len()))?;
        let first_block = blocks.first().copied().unwrap_or(FAT_EOC);

        let entry = FlatDirEntry::new(&name, size, first_block);
        dir.write_entry(self.io, self.meta, slot, entry)?;

        fat.allocate_chain(&blocks)?;
        fat.write_entries(self.io, self.meta, &blocks)?;

        let store = BlockStore::new(self.meta);
        for (block, chunk) in blocks.iter().zip(data.chunks(self.meta.unit_size())) {
            store.write_block(self.io, *block, chunk)?;
        }

        self.io.flush()?;
        Ok(FileEntry::from_slot(slot, &entry))
    }

    /// Returns the exact bytes of `name`.
    pub fn export(&mut self, name: &str) -> FsResult<Vec<u8>> {
        let name = FlatName::new(name)?;
        let dir = self.directory()?;
        let slot = dir.find(&name)?;
        let entry = *dir.entry(slot).ok_or(FsDirectoryError::NotFound)?;

        let size = entry.size() as usize;
        let fat = self.fat()?;
        let store = BlockStore::new(self.meta);

        let mut out = Vec::with_capacity(self.meta.blocks_for(size) * self.meta.unit_size());
        for block in fat.iter_chain(entry.first_block()) {
            if out.len() >= size {
                break;
            }
            out.extend_from_slice(&store.read_block(self.io, block?)?);
        }

        if out.len() < size {
            return Err(FsCursorError::Other("FAT chain shorter than recorded file size").into());
        }
        out.truncate(size);
        Ok(out)
    }

    /// Changes only the name field of `old`.
    pub fn rename(&mut self, old: &str, new: &str) -> FsResult {
        let old = FlatName::new(old)?;
        let new = FlatName::new(new)?;

        let mut dir = self.directory()?;
        let slot = dir.find(&old)?;
        let mut entry = *dir.entry(slot).ok_or(FsDirectoryError::NotFound)?;
        crate::ensure!(!entry.is_protected(), FsDirectoryError::Protected);
        if old == new {
            return Ok(());
        }
        crate::ensure!(!dir.contains(&new), FsDirectoryError::AlreadyExists);

        entry.set_name(&new);
        dir.write_entry(self.io, self.meta, slot, entry)?;
        self.io.flush()?;
        Ok(())
    }

    /// Frees the chain of `name` and clears its slot.
    pub fn remove(&mut self, name: &str) -> FsResult {
        let name = FlatName::new(name)?;

        let mut dir = self.directory()?;
        let slot = dir.find(&name)?;
        let entry = *dir.entry(slot).ok_or(FsDirectoryError::NotFound)?;
        crate::ensure!(!entry.is_protected(), FsDirectoryError::Protected);

        let mut fat = self.fat()?;
        let freed = fat.free_chain(entry.first_block())?;
        fat.write_entries(self.io, self.meta, &freed)?;
        dir.clear_entry(self.io, self.meta, slot)?;

        self.io.flush()?;
        Ok(())
    }

    /// Sets or clears the protection flag of `name`.
    pub fn set_protected(&mut self, name: &str, protected: bool) -> FsResult {
        let name = FlatName::new(name)?;

        let mut dir = self.directory()?;
        let slot = dir.find(&name)?;
        let mut entry = *dir.entry(slot).ok_or(FsDirectoryError::NotFound)?;
        entry.set_protected(protected);
        dir.write_entry(self.io, self.meta, slot, entry)?;

        self.io.flush()?;
        Ok(())
    }

    pub fn stat(&mut self, name: &str) -> FsResult<FileEntry> {
        let name = FlatName::new(name)?;
        let dir = self.directory()?;
        let slot = dir.find(&name)?;
        let entry = dir.entry(slot).ok_or(FsDirectoryError::NotFound)?;
        Ok(FileEntry::from_slot(slot, entry))
    }

    /// Every stored file, in slot order.
    pub fn entries(&mut self) -> FsResult<Vec<FileEntry>> {
        let dir = self.directory()?;
        Ok(dir
            .scan()
            .map(|(slot, entry)| FileEntry::from_slot(slot, entry))
            .collect())
    }

    /// Names of every stored file, in slot order.
    pub fn list_files(&mut self) -> FsResult<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|e| e.name).collect())
    }

    /// `(free_bytes, total_bytes)`: free FAT entries times the block size, and
    /// the declared container size.
    pub fn free_space(&mut self) -> FsResult<(u64, u64)> {
        let fat = self.fat()?;
        let free = fat.free_count() as u64 * self.meta.block_size as u64;
        Ok((free, self.meta.size_bytes()))
    }
}
