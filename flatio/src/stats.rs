// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOResult};

/// Simple IO counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    pub flushes: u64,

    // Alignment against `IOCounter::align` (block size for container IO)
    pub aligned_reads: u64,
    pub unaligned_reads: u64,
    pub aligned_writes: u64,
    pub unaligned_writes: u64,

    pub max_read: u64,
    pub max_write: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
pub struct IOCounter<'a, IO: BlockIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
    pub align: u64,
}

impl<'a, IO: BlockIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
            align: 1,
        }
    }

    #[inline]
    pub fn with_align(inner: &'a mut IO, align: u64) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
            align: align.max(1),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }

    #[inline]
    pub fn into_inner(self) -> &'a mut IO {
        self.inner
    }

    #[inline]
    fn is_aligned(&self, offset: u64, len: usize) -> bool {
        offset.is_multiple_of(self.align) && (len as u64).is_multiple_of(self.align)
    }
}

impl<'a, IO: BlockIO + ?Sized> BlockIO for IOCounter<'a, IO> {
    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        if self.is_aligned(offset, data.len()) {
            self.stats.aligned_writes += 1;
        } else {
            self.stats.unaligned_writes += 1;
        }
        self.stats.writes += 1;
        self.stats.write_bytes += data.len() as u64;
        self.stats.max_write = self.stats.max_write.max(data.len() as u64);

        self.inner.write_at(offset, data)
    }

    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        if self.is_aligned(offset, buf.len()) {
            self.stats.aligned_reads += 1;
        } else {
            self.stats.unaligned_reads += 1;
        }
        self.stats.reads += 1;
        self.stats.read_bytes += buf.len() as u64;
        self.stats.max_read = self.stats.max_read.max(buf.len() as u64);

        self.inner.read_at(offset, buf)
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }
}
