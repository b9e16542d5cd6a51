// SPDX-License-Identifier: MIT

pub mod bitmap;
pub mod name;

pub use bitmap::BitmapOps;
pub use name::FlatName;
