// SPDX-License-Identifier: MIT

use alloc::{vec, vec::Vec};

use flatio::prelude::*;

use crate::meta::FlatMeta;

/// Fixed-size block IO inside the data region.
#[derive(Debug, Clone, Copy)]
pub struct BlockStore<'a> {
    meta: &'a FlatMeta,
}

impl<'a> BlockStore<'a> {
    pub fn new(meta: &'a FlatMeta) -> Self {
        Self { meta }
    }

    #[inline]
    fn check(&self, block: u32) -> BlockIOResult<u64> {
        if !self.meta.is_valid_block(block) {
            return Err(BlockIOError::OutOfBounds);
        }
        Ok(self.meta.block_offset(block))
    }

    /// Reads exactly one block.
    pub fn read_block<IO: BlockIO + ?Sized>(&self, io: &mut IO, block: u32) -> BlockIOResult<Vec<u8>> {
        let mut buf = vec![0u8; self.meta.unit_size()];
        self.read_block_into(io, block, &mut buf)?;
        Ok(buf)
    }

    /// Reads one block into `buf`, which must be exactly one block long.
    pub fn read_block_into<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        block: u32,
        buf: &mut [u8],
    ) -> BlockIOResult {
        if buf.len() != self.meta.unit_size() {
            return Err(BlockIOError::Other("read_block: buffer is not one block long"));
        }
        let offset = self.check(block)?;
        io.read_at(offset, buf)
    }

    /// Writes `data` into one block, zero-padding the tail.
    pub fn write_block<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        block: u32,
        data: &[u8],
    ) -> BlockIOResult {
        let block_size = self.meta.unit_size();
        if data.len() > block_size {
            return Err(BlockIOError::Other("write_block: payload larger than a block"));
        }
        let offset = self.check(block)?;
        io.write_at(offset, data)?;
        if data.len() < block_size {
            io.zero_fill(offset + data.len() as u64, block_size - data.len())?;
        }
        Ok(())
    }
}
