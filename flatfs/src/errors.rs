// SPDX-License-Identifier: MIT

use core::fmt;

pub use flatio::errors::*;

macro_rules! impl_display_with_chain {
    ($($t:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.msg())?;
                    self.fmt_detail(f)?;
                    let mut current = self.source();
                    while let Some(src) = current {
                        write!(f, "\n  caused by: {}", src.msg())?;
                        current = src.source();
                    }
                    Ok(())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsLayoutError {
    ZeroSize,
    TooSmall(u64),
    TooLarge(u64),
    UnalignedBlockSize(u32),
    Other(&'static str),
}

impl FsLayoutError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsLayoutError::ZeroSize => "Container size must be greater than zero",
            FsLayoutError::TooSmall(_) => "Container too small to hold a single block",
            FsLayoutError::TooLarge(_) => "Container size does not fit the 32-bit header",
            FsLayoutError::UnalignedBlockSize(_) => "Block size must be a non-zero power of two",
            FsLayoutError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        None
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsLayoutError::TooSmall(size) | FsLayoutError::TooLarge(size) => {
                write!(f, " (size: {size} bytes)")
            }
            FsLayoutError::UnalignedBlockSize(size) => write!(f, " (block size: {size})"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAllocatorError {
    InsufficientSpace { needed: usize, available: usize },
    Other(&'static str),
}

impl FsAllocatorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsAllocatorError::InsufficientSpace { .. } => "Insufficient space in container",
            FsAllocatorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        None
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let FsAllocatorError::InsufficientSpace { needed, available } = self {
            write!(f, " (needed {needed} blocks, {available} free)")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCursorError {
    IO(BlockIOError),
    InvalidBlock(u32),
    UnlinkedBlock(u32),
    LoopDetected,
    Other(&'static str),
}

impl FsCursorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsCursorError::IO(_) => "IO error",
            FsCursorError::InvalidBlock(_) => "Invalid block in FAT chain",
            FsCursorError::UnlinkedBlock(_) => "FAT chain runs into a free block",
            FsCursorError::LoopDetected => "Loop detected in FAT chain",
            FsCursorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsCursorError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsCursorError::InvalidBlock(block) | FsCursorError::UnlinkedBlock(block) => {
                write!(f, " (block: {block})")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsDirectoryError {
    IO(BlockIOError),
    NotFound,
    DirectoryFull,
    NameTooLong(usize),
    InvalidName,
    AlreadyExists,
    Protected,
    Other(&'static str),
}

impl FsDirectoryError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsDirectoryError::IO(_) => "IO error",
            FsDirectoryError::NotFound => "File not found in container",
            FsDirectoryError::DirectoryFull => "Directory is full",
            FsDirectoryError::NameTooLong(_) => "File name too long",
            FsDirectoryError::InvalidName => "Invalid file name",
            FsDirectoryError::AlreadyExists => "A file with that name already exists",
            FsDirectoryError::Protected => "File is protected",
            FsDirectoryError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsDirectoryError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let FsDirectoryError::NameTooLong(len) = self {
            write!(
                f,
                " ({len} bytes, max {})",
                crate::constant::FLAT_NAME_LEN
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsFormatterError {
    IO(BlockIOError),
    Layout(FsLayoutError),
    Other(&'static str),
}

impl FsFormatterError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsFormatterError::IO(_) => "IO error",
            FsFormatterError::Layout(_) => "Layout error",
            FsFormatterError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsFormatterError::IO(e) => Some(FsError::IO(*e)),
            FsFormatterError::Layout(e) => Some(FsError::Layout(*e)),
            _ => None,
        }
    }

    fn fmt_detail(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCheckerError {
    IO(BlockIOError),
    Cursor(FsCursorError),
    Other(&'static str),
}

impl FsCheckerError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsCheckerError::IO(_) => "IO error",
            FsCheckerError::Cursor(_) => "Cursor error",
            FsCheckerError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsCheckerError::IO(e) => Some(FsError::IO(*e)),
            FsCheckerError::Cursor(e) => Some(FsError::Cursor(*e)),
            _ => None,
        }
    }

    fn fmt_detail(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

/// Top-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IO(BlockIOError),
    Layout(FsLayoutError),
    Allocator(FsAllocatorError),
    Cursor(FsCursorError),
    Directory(FsDirectoryError),
    Formatter(FsFormatterError),
    Checker(FsCheckerError),
    /// The host file handed to an import could not be read.
    SourceMissing,
    /// The container already exists on the host.
    ContainerExists,
    /// A header field disagrees with the configured layout; carries the field name.
    HeaderMismatch(&'static str),
    Other(&'static str),
}

impl FsError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsError::IO(e) => e.msg(),
            FsError::Layout(e) => e.msg(),
            FsError::Allocator(e) => e.msg(),
            FsError::Cursor(e) => e.msg(),
            FsError::Directory(e) => e.msg(),
            FsError::Formatter(e) => e.msg(),
            FsError::Checker(e) => e.msg(),
            FsError::SourceMissing => "Import source not found or unreadable",
            FsError::ContainerExists => "Container already exists",
            FsError::HeaderMismatch(_) => "Container header does not match the configured layout",
            FsError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsError::Layout(e) => e.source(),
            FsError::Allocator(e) => e.source(),
            FsError::Cursor(e) => e.source(),
            FsError::Directory(e) => e.source(),
            FsError::Formatter(e) => e.source(),
            FsError::Checker(e) => e.source(),
            FsError::IO(_)
            | FsError::SourceMissing
            | FsError::ContainerExists
            | FsError::HeaderMismatch(_)
            | FsError::Other(_) => None,
        }
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::Layout(e) => e.fmt_detail(f),
            FsError::Allocator(e) => e.fmt_detail(f),
            FsError::Cursor(e) => e.fmt_detail(f),
            FsError::Directory(e) => e.fmt_detail(f),
            FsError::HeaderMismatch(field) => write!(f, " (field: {field})"),
            _ => Ok(()),
        }
    }

    /// `true` when the named file is absent from the directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::Directory(FsDirectoryError::NotFound))
    }

    /// `true` when the FAT has fewer free blocks than an import needs.
    pub fn is_insufficient_space(&self) -> bool {
        matches!(
            self,
            FsError::Allocator(FsAllocatorError::InsufficientSpace { .. })
        )
    }
}

impl_display_with_chain!(
    FsLayoutError,
    FsAllocatorError,
    FsCursorError,
    FsDirectoryError,
    FsFormatterError,
    FsCheckerError,
    FsError,
);

#[cfg(feature = "std")]
impl std::error::Error for FsError {}

// === type Fs*Result ===

pub type FsResult<T = ()> = Result<T, FsError>;
pub type FsLayoutResult<T = ()> = Result<T, FsLayoutError>;
pub type FsAllocatorResult<T = ()> = Result<T, FsAllocatorError>;
pub type FsCursorResult<T = ()> = Result<T, FsCursorError>;
pub type FsDirectoryResult<T = ()> = Result<T, FsDirectoryError>;
pub type FsFormatterResult<T = ()> = Result<T, FsFormatterError>;
pub type FsCheckerResult<T = ()> = Result<T, FsCheckerError>;

crate::fs_error_wiring! {
    top => FsError {
        BlockIOError     : IO,
        FsLayoutError    : Layout,
        FsAllocatorError : Allocator,
        FsCursorError    : Cursor,
        FsDirectoryError : Directory,
        FsFormatterError : Formatter,
        FsCheckerError   : Checker,
    },
    str_into => [
        FsLayoutError,
        FsAllocatorError,
        FsCursorError,
        FsDirectoryError,
        FsFormatterError,
        FsCheckerError,
    ],
    sub => {
        BlockIOError  => [ FsCursorError::IO, FsDirectoryError::IO, FsFormatterError::IO, FsCheckerError::IO ],
        FsLayoutError => [ FsFormatterError::Layout ],
        FsCursorError => [ FsCheckerError::Cursor ],
    },
}
