// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;

// Core modules
pub mod errors;
#[macro_use]
mod macros;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std_io;

pub mod prelude {
    pub use super::BlockIO;
    pub use super::BlockIOExt;
    pub use super::BlockIOSetLen;
    #[cfg(feature = "alloc")]
    pub use super::BlockIOStreamExt;
    pub use super::BlockIOStructExt;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemBlockIO;

    #[cfg(feature = "std")]
    pub use super::std_io::StdBlockIO;
}

pub use errors::*;

/// Size of the internal scratch buffer used by chunked and zero-fill helpers.
pub const BLOCK_BUF_SIZE: usize = 4096;

/// Positional IO over a container.
///
/// Every call addresses an absolute byte offset; implementations keep no
/// cursor state that callers can observe.
pub trait BlockIO {
    /// Writes `data` at `offset`.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult;

    /// Reads exactly `buf.len()` bytes from `offset` into `buf`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> BlockIOResult;
}

impl<T: BlockIO + ?Sized> BlockIO for &mut T {
    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        (**self).write_at(offset, data)
    }

    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        (**self).read_at(offset, buf)
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        (**self).flush()
    }
}

/// Extension helpers for BlockIO.
///
/// - chunked reads/writes
/// - zero fill
/// - little-endian primitive helpers (`read_u32_at`, `write_u32_at`, ...)
pub trait BlockIOExt: BlockIO {
    /// Reads `buf.len()` bytes from `offset` in chunks of `chunk_size` or less.
    #[inline(always)]
    fn read_in_chunks(&mut self, offset: u64, buf: &mut [u8], chunk_size: usize) -> BlockIOResult {
        let mut off = offset;
        for chunk in buf.chunks_mut(chunk_size.max(1)) {
            self.read_at(off, chunk)?;
            off += chunk.len() as u64;
        }
        Ok(())
    }

    /// Writes `buf.len()` bytes at `offset` in chunks of `chunk_size` or less.
    #[inline(always)]
    fn write_in_chunks(&mut self, offset: u64, buf: &[u8], chunk_size: usize) -> BlockIOResult {
        let mut off = offset;
        for chunk in buf.chunks(chunk_size.max(1)) {
            self.write_at(off, chunk)?;
            off += chunk.len() as u64;
        }
        Ok(())
    }

    /// Fills `len` bytes at `offset` with zeroes.
    #[inline(always)]
    fn zero_fill(&mut self, offset: u64, len: usize) -> BlockIOResult {
        const ZERO_BUF: [u8; BLOCK_BUF_SIZE] = [0u8; BLOCK_BUF_SIZE];
        let mut remaining = len;
        let mut off = offset;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_BUF.len());
            self.write_at(off, &ZERO_BUF[..chunk])?;
            off += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }

    // Implements read/write helpers for primitive types
    blockio_impl_primitive_rw!(u8, u16, u32, u64);
}

impl<T: BlockIO + ?Sized> BlockIOExt for T {}

/// Streams of fixed-size records (FAT entries, directory slots).
#[cfg(feature = "alloc")]
pub trait BlockIOStreamExt: BlockIO {
    /// Reads `count` records of `N` bytes starting at `offset`, `chunk` records per IO,
    /// handing each one to `f` with its index.
    fn read_chunks_streamed<const N: usize, F>(
        &mut self,
        offset: u64,
        count: usize,
        chunk: usize,
        f: F,
    ) -> BlockIOResult
    where
        F: FnMut(usize, &[u8; N]);

    /// Writes `count` records of `N` bytes starting at `offset`, `chunk` records per IO,
    /// asking `f` for the bytes of each index.
    fn write_chunks_streamed<const N: usize, F>(
        &mut self,
        offset: u64,
        count: usize,
        chunk: usize,
        f: F,
    ) -> BlockIOResult
    where
        F: FnMut(usize) -> [u8; N];
}

#[cfg(feature = "alloc")]
impl<T: BlockIO + ?Sized> BlockIOStreamExt for T {
    #[inline]
    fn read_chunks_streamed<const N: usize, F>(
        &mut self,
        offset: u64,
        count: usize,
        chunk: usize,
        mut f: F,
    ) -> BlockIOResult
    where
        F: FnMut(usize, &[u8; N]),
    {
        let chunk = chunk.max(1);
        let mut buf = vec![0u8; chunk * N];

        let mut remaining = count;
        let mut current_offset = offset;
        let mut index = 0;

        while remaining > 0 {
            let to_read = remaining.min(chunk);
            let bytes_to_read = to_read * N;
            self.read_in_chunks(current_offset, &mut buf[..bytes_to_read], BLOCK_BUF_SIZE)?;

            for record in buf[..bytes_to_read].chunks_exact(N) {
                let mut bytes = [0u8; N];
                bytes.copy_from_slice(record);
                f(index, &bytes);
                index += 1;
            }

            current_offset += bytes_to_read as u64;
            remaining -= to_read;
        }

        Ok(())
    }

    #[inline]
    fn write_chunks_streamed<const N: usize, F>(
        &mut self,
        offset: u64,
        count: usize,
        chunk: usize,
        mut f: F,
    ) -> BlockIOResult
    where
        F: FnMut(usize) -> [u8; N],
    {
        let chunk = chunk.max(1);
        let mut buf = vec![0u8; chunk * N];

        let mut remaining = count;
        let mut current_offset = offset;
        let mut index = 0;

        while remaining > 0 {
            let to_write = remaining.min(chunk);
            let bytes_to_write = to_write * N;

            for record in buf[..bytes_to_write].chunks_exact_mut(N) {
                record.copy_from_slice(&f(index));
                index += 1;
            }

            self.write_in_chunks(current_offset, &buf[..bytes_to_write], BLOCK_BUF_SIZE)?;

            current_offset += bytes_to_write as u64;
            remaining -= to_write;
        }

        Ok(())
    }
}

/// Resizable storage.
pub trait BlockIOSetLen: BlockIO {
    /// Sets the length of the storage.
    fn set_len(&mut self, len: u64) -> BlockIOResult;
}

/// Reads and writes `zerocopy` structs at absolute offsets.
pub trait BlockIOStructExt: BlockIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> BlockIOResult<T> {
        let size = core::mem::size_of::<T>();
        if size > BLOCK_BUF_SIZE {
            return Err(BlockIOError::Other("read_struct: type too large"));
        }
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| BlockIOError::Other("read_struct failed"))
    }

    /// Writes a struct of type `T` at the given offset.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::Immutable>(
        &mut self,
        offset: u64,
        val: &T,
    ) -> BlockIOResult {
        self.write_at(offset, val.as_bytes())
    }
}

impl<T: BlockIO + ?Sized> BlockIOStructExt for T {}
