// SPDX-License-Identifier: MIT

//! Path-based access to a container on the host filesystem.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use flatio::prelude::*;

use crate::{
    checker::{FlatCheckOptions, FlatChecker, FsChecker, VerifyReport},
    errors::*,
    formatter::{FlatFormatter, FsFormatter},
    meta::FlatMeta,
    types::FlatHeader,
    volume::{FileEntry, Volume},
};

type FileVolume<'v, 'io> = Volume<'v, StdBlockIO<'io, File>>;

/// A container identified by its host path and layout.
///
/// No handle is held between calls: every operation opens the file, works on
/// it through a [`Volume`], flushes, and closes it before returning.
#[derive(Debug, Clone)]
pub struct FlatFs {
    path: PathBuf,
    meta: FlatMeta,
}

impl FlatFs {
    /// Creates and formats a new container of `total_size` bytes.
    ///
    /// Fails with `ContainerExists` rather than overwrite an existing file.
    pub fn create(path: impl AsRef<Path>, total_size: u64) -> FsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = FlatMeta::new(total_size)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FsError::ContainerExists,
                _ => FsError::IO(e.into()),
            })?;

        let mut io = StdBlockIO::new(&mut file);
        io.set_len(meta.image_len())?;
        FlatFormatter::new(&mut io, &meta).format(false)?;
        Ok(Self { path, meta })
    }

    /// Opens an existing container, checking its header against the layout
    /// derived from `total_size`.
    pub fn open(path: impl AsRef<Path>, total_size: u64) -> FsResult<Self> {
        let fs = Self {
            path: path.as_ref().to_path_buf(),
            meta: FlatMeta::new(total_size)?,
        };
        fs.with_volume(false, |vol| vol.validate_header())?;
        Ok(fs)
    }

    /// Opens an existing container, taking its size from the stored header.
    pub fn open_auto(path: impl AsRef<Path>) -> FsResult<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| FsError::IO(e.into()))?;
        let header = FlatHeader::read(&mut StdBlockIO::new(&mut file))?;
        Self::open(path, header.total_size() as u64)
    }

    /// Opens the container at `path`, creating it first if it does not exist.
    pub fn open_or_create(path: impl AsRef<Path>, total_size: u64) -> FsResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path, total_size)
        } else {
            Self::create(path, total_size)
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn meta(&self) -> &FlatMeta {
        &self.meta
    }

    fn open_file(&self, write: bool) -> FsResult<File> {
        OpenOptions::new()
            .read(true)
            .write(write)
            .open(&self.path)
            .map_err(|e| FsError::IO(e.into()))
    }

    /// Runs `f` over a freshly opened handle, which is dropped on every exit path.
    fn with_volume<R>(
        &self,
        write: bool,
        f: impl FnOnce(&mut FileVolume<'_, '_>) -> FsResult<R>,
    ) -> FsResult<R> {
        let mut file = self.open_file(write)?;
        let mut io = StdBlockIO::new(&mut file);
        let mut vol = Volume::new(&mut io, &self.meta);
        let out = f(&mut vol)?;
        if write {
            io.flush()?;
        }
        Ok(out)
    }

    pub fn read_header(&self) -> FsResult<FlatHeader> {
        self.with_volume(false, |vol| vol.read_header())
    }

    /// Stores `data` under `name`.
    pub fn copy_in(&self, data: &[u8], name: &str) -> FsResult<FileEntry> {
        self.with_volume(true, |vol| vol.import(name, data))
    }

    /// Returns the stored bytes of `name`.
    pub fn copy_out(&self, name: &str) -> FsResult<Vec<u8>> {
        self.with_volume(false, |vol| vol.export(name))
    }

    /// Imports the host file `src` under `name`.
    pub fn import_file(&self, src: impl AsRef<Path>, name: &str) -> FsResult<FileEntry> {
        let data = fs::read(src).map_err(|_| FsError::SourceMissing)?;
        self.copy_in(&data, name)
    }

    /// Writes the bytes of `name` to the host file `dest`, replacing it.
    pub fn export_file(&self, name: &str, dest: impl AsRef<Path>) -> FsResult<usize> {
        let data = self.copy_out(name)?;
        fs::write(dest, &data).map_err(|e| FsError::IO(e.into()))?;
        Ok(data.len())
    }

    pub fn rename(&self, old: &str, new: &str) -> FsResult {
        self.with_volume(true, |vol| vol.rename(old, new))
    }

    pub fn remove(&self, name: &str) -> FsResult {
        self.with_volume(true, |vol| vol.remove(name))
    }

    pub fn set_protected(&self, name: &str, protected: bool) -> FsResult {
        self.with_volume(true, |vol| vol.set_protected(name, protected))
    }

    pub fn stat(&self, name: &str) -> FsResult<FileEntry> {
        self.with_volume(false, |vol| vol.stat(name))
    }

    pub fn entries(&self) -> FsResult<Vec<FileEntry>> {
        self.with_volume(false, |vol| vol.entries())
    }

    pub fn list_files(&self) -> FsResult<Vec<String>> {
        self.with_volume(false, |vol| vol.list_files())
    }

    /// `(free_bytes, total_bytes)`.
    pub fn free_space(&self) -> FsResult<(u64, u64)> {
        self.with_volume(false, |vol| vol.free_space())
    }

    /// Runs every checker phase over the container.
    pub fn check(&self) -> FsResult<VerifyReport> {
        self.check_with(&FlatCheckOptions::default())
    }

    pub fn check_with(&self, opt: &FlatCheckOptions) -> FsResult<VerifyReport> {
        let mut file = self.open_file(false)?;
        let mut io = StdBlockIO::new(&mut file);
        Ok(FlatChecker::new(&mut io, &self.meta).check_with(opt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::*;

    const SIX_MIB: u64 = 6 * 1024 * 1024;

    #[test]
    fn test_create_sizes_image_and_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.img");

        let fs = FlatFs::create(&path, SIX_MIB).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            fs.meta().image_len()
        );

        let header = fs.read_header().unwrap();
        assert_eq!(header.total_size() as u64, SIX_MIB);
        assert_eq!(header.block_size(), FLAT_BLOCK_SIZE);
        assert_eq!(header.fat_offset(), FLAT_HEADER_SIZE);
        assert_eq!(fs.free_space().unwrap(), (12288 * 512, SIX_MIB));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.img");
        FlatFs::create(&path, SIX_MIB).unwrap();
        assert_eq!(
            FlatFs::create(&path, SIX_MIB).unwrap_err(),
            FsError::ContainerExists
        );
    }

    #[test]
    fn test_open_checks_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.img");
        FlatFs::create(&path, SIX_MIB).unwrap();

        assert!(FlatFs::open(&path, SIX_MIB).is_ok());
        assert_eq!(
            FlatFs::open(&path, 2 * SIX_MIB).unwrap_err(),
            FsError::HeaderMismatch("total_size")
        );
    }

    #[test]
    fn test_open_auto_reads_size_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.img");
        FlatFs::create(&path, 2 * SIX_MIB).unwrap();

        let fs = FlatFs::open_auto(&path).unwrap();
        assert_eq!(fs.meta().size_bytes(), 2 * SIX_MIB);
        assert!(FlatFs::open_auto(dir.path().join("none.img")).is_err());
    }

    #[test]
    fn test_open_or_create_reuses_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.img");

        let fs = FlatFs::open_or_create(&path, SIX_MIB).unwrap();
        fs.copy_in(b"persisted", "p").unwrap();
        drop(fs);

        let fs = FlatFs::open_or_create(&path, SIX_MIB).unwrap();
        assert_eq!(fs.copy_out("p").unwrap(), b"persisted");
    }

    #[test]
    fn test_import_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FlatFs::create(dir.path().join("box.img"), SIX_MIB).unwrap();
        assert_eq!(
            fs.import_file(dir.path().join("absent.bin"), "x")
                .unwrap_err(),
            FsError::SourceMissing
        );
        assert!(fs.list_files().unwrap().is_empty());
    }
}
