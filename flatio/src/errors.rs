// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for BlockIO operations.
pub type BlockIOResult<T = ()> = core::result::Result<T, BlockIOError>;

/// Error type for BlockIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockIOError {
    Other(&'static str),
    OutOfBounds,
    UnexpectedEof,
    PermissionDenied,
    NotFound,
    Unsupported,
}

impl BlockIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            BlockIOError::Other(msg) => msg,
            BlockIOError::OutOfBounds => "Out of bounds",
            BlockIOError::UnexpectedEof => "Unexpected end of container",
            BlockIOError::PermissionDenied => "Permission denied",
            BlockIOError::NotFound => "No such file",
            BlockIOError::Unsupported => "Unsupported operation",
        }
    }
}

impl From<&'static str> for BlockIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        BlockIOError::Other(msg)
    }
}

impl fmt::Display for BlockIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for BlockIOError {
    #[cold]
    #[inline(never)]
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match e.kind() {
            ErrorKind::UnexpectedEof => BlockIOError::UnexpectedEof,
            ErrorKind::PermissionDenied => BlockIOError::PermissionDenied,
            ErrorKind::NotFound => BlockIOError::NotFound,
            ErrorKind::Unsupported => BlockIOError::Unsupported,
            ErrorKind::InvalidInput => BlockIOError::Other("Invalid input"),
            ErrorKind::WriteZero => BlockIOError::Other("Write returned zero bytes"),
            _ => BlockIOError::Other("Host IO error"),
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(BlockIOError::from(eof), BlockIOError::UnexpectedEof);

        let other = std::io::Error::other("boom");
        assert_eq!(BlockIOError::from(other).msg(), "Host IO error");
    }
}
