// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spinn-structures

Value types shared by every stage of the spinn compiler:

- [`ObjectId`], [`ObjectKind`], [`NetworkObject`] - identities of network objects
- [`Slice`] - contiguous atom (or dimension) ranges and their splitting
- [`TransformMatrix`], [`Transform`] - connection transforms with content equality
- [`fixed_point`] - saturating fixed-point encoding of real values
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod fixed_point;
pub mod object;
pub mod slice;
pub mod transform;

pub use error::{SpinnDataError, SpinnDataResult};
pub use fixed_point::{bitsk, kbits, FixedPointFormat};
pub use object::{NetworkObject, ObjectId, ObjectKind, ObjectRegistry};
pub use slice::Slice;
pub use transform::{SampleMatrix, Transform, TransformMatrix};
