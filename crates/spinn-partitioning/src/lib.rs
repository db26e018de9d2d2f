// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spinn-partitioning

Splits [`Vertex`]es into per-core slices so that every [`Constraint`]
holds, then expands graph edges into edges between the resulting
[`SplitVertex`]es.

## Features

- `parallel` (default): vertices are partitioned on the rayon pool.
  Results keep the input order either way.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constraint;
pub mod error;
pub mod partition;
pub mod vertex;

pub use constraint::Constraint;
pub use error::{PartitionError, PartitionResult};
pub use partition::{
    get_split_edges, get_split_vertices, partition_vertex, partition_vertices, Partitions, SplitEdge,
    SplitVertices,
};
pub use vertex::{SplitVertex, Vertex};
