// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Concrete region types.

pub mod keys;
pub mod list;
pub mod matrix;
pub mod recording;

pub use keys::{KeyFieldFn, KeysRegion};
pub use list::ListRegion;
pub use matrix::{MatrixPartitioning, MatrixPrepend, MatrixRegion};
pub use recording::BitfieldRecordingRegion;
