// SPDX-License-Identifier: MIT

//! Bit-level access to byte slices used as block bitmaps.

/// Bitmap view over a byte slice.
///
/// Bit `i` lives in byte `i / 8` at position `i % 8`, LSB first.
pub trait BitmapOps {
    /// Sets or clears bit `bit`. Out-of-range bits are ignored.
    fn set_bit(&mut self, bit: usize, value: bool);

    /// Reads bit `bit`. Out-of-range bits read as `false`.
    fn get_bit(&self, bit: usize) -> bool;

    fn count_ones(&self) -> usize;
}

impl BitmapOps for [u8] {
    #[inline]
    fn set_bit(&mut self, bit: usize, value: bool) {
        if let Some(byte) = self.get_mut(bit / 8) {
            let mask = 1u8 << (bit % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    #[inline]
    fn get_bit(&self, bit: usize) -> bool {
        self.get(bit / 8)
            .is_some_and(|b| (b & (1 << (bit % 8))) != 0)
    }

    fn count_ones(&self) -> usize {
        self.iter().map(|b| b.count_ones() as usize).sum()
    }
}
