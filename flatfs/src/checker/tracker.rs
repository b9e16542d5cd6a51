// SPDX-License-Identifier: MIT

//! Block ownership tracking for chain walks.

use alloc::{vec, vec::Vec};

use crate::utils::BitmapOps;

/// Records which blocks some directory entry reaches, one bit per block.
#[derive(Debug, Clone)]
pub struct ReachabilityTracker {
    bitmap: Vec<u8>,
    count: usize,
}

impl ReachabilityTracker {
    pub fn new(count: usize) -> Self {
        Self {
            bitmap: vec![0u8; count.div_ceil(8)],
            count,
        }
    }

    /// Marks `block` as reached. Returns `false` if it was already marked,
    /// meaning two chains share it.
    #[inline]
    pub fn mark(&mut self, block: u32) -> bool {
        let idx = block as usize;
        if idx >= self.count {
            return true;
        }
        if self.bitmap.get_bit(idx) {
            return false;
        }
        self.bitmap.set_bit(idx, true);
        true
    }

    #[inline]
    pub fn is_marked(&self, block: u32) -> bool {
        (block as usize) < self.count && self.bitmap.get_bit(block as usize)
    }

    pub fn marked(&self) -> usize {
        self.bitmap.count_ones()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Counts blocks set in `allocated` but never reached.
    pub fn count_orphans(&self, allocated: &[u8]) -> usize {
        (0..self.count)
            .filter(|&i| allocated.get_bit(i) && !self.bitmap.get_bit(i))
            .count()
    }

    /// Calls `f` for at most `limit` orphan blocks, in ascending order.
    pub fn for_each_orphan<F>(&self, allocated: &[u8], limit: usize, mut f: F)
    where
        F: FnMut(u32),
    {
        (0..self.count)
            .filter(|&i| allocated.get_bit(i) && !self.bitmap.get_bit(i))
            .take(limit)
            .for_each(|i| f(i as u32));
    }
}
