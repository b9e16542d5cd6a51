// SPDX-License-Identifier: MIT

pub mod entry;
pub mod header;

pub use entry::*;
pub use header::*;
