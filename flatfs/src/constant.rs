// SPDX-License-Identifier: MIT

// === Container Layout Parameters ===

pub const FLAT_BLOCK_SIZE: u32 = 512;
pub const FLAT_HEADER_SIZE: u32 = 1024;

/// Smallest container the command-line shell will create (6 MiB).
pub const FLAT_MIN_CONTAINER_SIZE: u64 = 6 * 1024 * 1024;

// === FAT Region Parameters ===

pub const FAT_ENTRY_SIZE: usize = 4;
pub const FAT_FREE: u32 = 0x0000_0000;
pub const FAT_EOC: u32 = 0xFFFF_FFFF;

/// FAT entries moved per IO when loading or storing the whole table.
pub const FAT_STREAM_CHUNK: usize = 1024;

// === Directory Region Parameters ===

pub const DIR_ENTRY_SIZE: usize = 64;
pub const FLAT_NAME_LEN: usize = 50;
pub const DIR_RESERVED_LEN: usize = 5;
pub const DIR_ENTRY_EMPTY: u8 = 0x00;

/// Directory slots moved per IO when loading the whole directory.
pub const DIR_STREAM_CHUNK: usize = 64;
