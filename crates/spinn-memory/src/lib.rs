// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spinn-memory

Memory images for placed cores.

- [`Region`] - a typed block sized and rendered per slice:
  [`ListRegion`], [`MatrixRegion`], [`KeysRegion`], [`BitfieldRecordingRegion`]
- [`Subregion`] - a rendered block of little-endian words
- [`output`] - pointer tables, node memory allocation and the [`LoadPlan`]
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod formatter;
pub mod output;
pub mod region;
pub mod regions;

pub use error::{MemoryError, MemoryResult};
pub use formatter::WordFormatter;
pub use output::{
    create_app_pointer_table_region, generate_data_for_placements, get_region_offsets, get_total_bytes_used,
    write_core_region_files, LoadPlan, OutputGenerator, PlacedSubvertex, PointerTableHeader, RegionWrite,
    RegisterWrite,
};
pub use region::{Region, Subregion};
pub use regions::{
    BitfieldRecordingRegion, KeyFieldFn, KeysRegion, ListRegion, MatrixPartitioning, MatrixPrepend, MatrixRegion,
};
