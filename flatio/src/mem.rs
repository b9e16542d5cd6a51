// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOError, BlockIOResult, BlockIOSetLen};

/// In-memory implementation of `BlockIO`.
///
/// Useful for tests and RAM-backed containers.
#[derive(Debug)]
pub struct MemBlockIO<'a> {
    buffer: &'a mut [u8],
    logical_len: usize,
}

impl<'a> MemBlockIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let logical_len = buffer.len();
        Self {
            buffer,
            logical_len,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.logical_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.logical_len == 0
    }

    #[inline]
    fn check_bounds(&self, offset: u64, len: usize) -> BlockIOResult<usize> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(BlockIOError::OutOfBounds)?;
        if end > self.logical_len as u64 {
            return Err(BlockIOError::OutOfBounds);
        }
        Ok(offset as usize)
    }
}

impl<'a> BlockIO for MemBlockIO<'a> {
    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        let start = self.check_bounds(offset, data.len())?;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        let start = self.check_bounds(offset, buf.len())?;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        Ok(())
    }
}

impl<'a> BlockIOSetLen for MemBlockIO<'a> {
    fn set_len(&mut self, new_len: u64) -> BlockIOResult {
        if new_len > self.buffer.len() as u64 {
            return Err(BlockIOError::OutOfBounds);
        }
        self.logical_len = new_len as usize;
        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod test {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_rw() {
        let mut buf = [0u8; 256];
        let mut io = MemBlockIO::new(&mut buf);
        io.write_at(10, &[1, 2, 3, 4]).unwrap();

        let mut output = [0u8; 4];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buf = [0u8; 16];
        let mut io = MemBlockIO::new(&mut buf);
        assert_eq!(io.write_at(14, &[0; 4]), Err(BlockIOError::OutOfBounds));
        assert_eq!(io.read_at(u64::MAX, &mut [0; 1]), Err(BlockIOError::OutOfBounds));
    }

    #[test]
    fn test_set_len_safe() {
        let mut buf = [0u8; 512];
        let mut io = MemBlockIO::new(&mut buf);
        io.set_len(256).unwrap();
        assert_eq!(io.len(), 256);
        assert!(io.write_at(300, &[1]).is_err());
        assert!(io.set_len(1024).is_err());
    }

    #[test]
    fn test_u32_helpers_are_little_endian() {
        let mut buf = [0u8; 8];
        let mut io = MemBlockIO::new(&mut buf);
        io.write_u32_at(4, 0xFFFF_FFFF).unwrap();
        io.write_u32_at(0, 0x0102_0304).unwrap();
        assert_eq!(io.read_u32_at(4).unwrap(), u32::MAX);
        assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_chunks_streamed_rw() {
        let mut buf = [0u8; 1024];
        let mut io = MemBlockIO::new(&mut buf);

        io.write_chunks_streamed::<4, _>(0, 10, 3, |i| (i as u32).to_le_bytes())
            .unwrap();

        let mut values = [0u32; 10];
        io.read_chunks_streamed::<4, _>(0, 10, 3, |i, bytes| {
            values[i] = u32::from_le_bytes(*bytes);
        })
        .unwrap();

        for (i, v) in values.iter().enumerate() {
            assert_eq!(*v, i as u32);
        }
    }

    #[test]
    fn test_zero_fill() {
        let mut buf = [0xFF; 64];
        let mut io = MemBlockIO::new(&mut buf);

        io.zero_fill(10, 8).unwrap();

        let mut output = [0xAA; 8];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [0u8; 8]);
    }
}
