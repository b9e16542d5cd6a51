// SPDX-License-Identifier: MIT

use flatio::prelude::*;

pub use crate::errors::{FsFormatterError, FsFormatterResult};

use crate::{fat::FatTable, meta::FlatMeta, types::FlatHeader};

/// Prepares the on-disk structures of a container.
pub trait FsFormatter {
    /// Format the container.
    ///
    /// - `full_format`: if `true`, also zero the data region
    #[must_use = "format result must be checked for errors"]
    fn format(&mut self, full_format: bool) -> FsFormatterResult;
}

/// FlatFormatter:
/// - writes the header once, zero-padded to `header_size`
/// - writes an all-free FAT and an empty directory
/// - quick format only touches the last byte of the data region so the host
///   file reaches `image_len`; full format zeroes every block
pub struct FlatFormatter<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a FlatMeta,
}

impl<'a, IO: BlockIO + ?Sized> FlatFormatter<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a FlatMeta) -> Self {
        Self { io, meta }
    }

    fn write_header(&mut self) -> FsFormatterResult {
        let header = FlatHeader::from_meta(self.meta);
        header.write(self.io)?;

        let written = core::mem::size_of::<FlatHeader>();
        let remaining = (self.meta.header_size as usize).saturating_sub(written);
        self.io.zero_fill(written as u64, remaining)?;
        Ok(())
    }

    fn write_fat_region(&mut self) -> FsFormatterResult {
        FatTable::new_free(self.meta).write_all(self.io, self.meta)?;
        Ok(())
    }

    fn write_directory_region(&mut self) -> FsFormatterResult {
        self.io
            .zero_fill(self.meta.dir_offset, self.meta.dir_len_bytes())?;
        Ok(())
    }

    fn zero_data_region(&mut self) -> FsFormatterResult {
        let len = self.meta.image_len() - self.meta.data_offset;
        self.io.zero_fill(self.meta.data_offset, len as usize)?;
        Ok(())
    }

    fn extend_to_image_len(&mut self) -> FsFormatterResult {
        self.io.write_at(self.meta.image_len() - 1, &[0])?;
        Ok(())
    }
}

impl<'a, IO: BlockIO + ?Sized> FsFormatter for FlatFormatter<'a, IO> {
    fn format(&mut self, full_format: bool) -> FsFormatterResult {
        self.write_header()?;
        self.write_fat_region()?;
        self.write_directory_region()?;
        if full_format {
            self.zero_data_region()?;
        } else {
            self.extend_to_image_len()?;
        }
        self.io.flush()?;
        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::{constant::*, dir::DirectoryTable};

    #[test]
    fn test_format_produces_empty_container() {
        let meta = FlatMeta::new_custom(16 * 512, 512, 64).unwrap();
        let mut buf = vec![0xAAu8; meta.image_len() as usize];
        let mut io = MemBlockIO::new(&mut buf);

        FlatFormatter::new(&mut io, &meta).format(true).unwrap();

        assert_eq!(FlatHeader::read(&mut io).unwrap().mismatch(&meta), None);
        let fat = FatTable::read_all(&mut io, &meta).unwrap();
        assert_eq!(fat.free_count(), 16);
        let dir = DirectoryTable::read_all(&mut io, &meta).unwrap();
        assert_eq!(dir.occupied(), 0);
        assert!(buf[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_quick_format_extends_host_file() {
        let meta = FlatMeta::new(FLAT_MIN_CONTAINER_SIZE).unwrap();
        let mut file = tempfile::tempfile().unwrap();
        {
            let mut io = StdBlockIO::new(&mut file);
            FlatFormatter::new(&mut io, &meta).format(false).unwrap();
        }
        assert_eq!(file.metadata().unwrap().len(), meta.image_len());
    }
}
