// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod macros;

// Core modules
pub mod attr;
pub mod constant;
pub mod errors;
pub mod meta;
pub mod types;
pub mod utils;

// On-disk structures
pub mod dir;
pub mod fat;
pub mod store;

// Operations
pub mod checker;
pub mod formatter;
pub mod volume;

#[cfg(feature = "std")]
pub mod filesystem;

pub mod traits {
    pub use super::checker::FsChecker;
    pub use super::formatter::FsFormatter;
}

pub use errors::*;
pub use meta::FlatMeta;
pub use volume::{FileEntry, Volume};

#[cfg(feature = "std")]
pub use filesystem::FlatFs;

pub mod prelude {
    pub use flatio::prelude::*;

    pub use super::checker::{FlatCheckOptions, FlatChecker, Finding, Severity, VerifyReport};
    pub use super::constant::*;
    pub use super::errors::*;
    pub use super::formatter::FlatFormatter;
    pub use super::meta::FlatMeta;
    pub use super::traits::*;
    pub use super::volume::{FileEntry, Volume};

    #[cfg(feature = "std")]
    pub use super::filesystem::FlatFs;
}
