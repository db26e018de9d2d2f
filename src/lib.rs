// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spinn - compiler core for many-core neuromorphic hardware
//!
//! `spinn` turns a dataflow graph of interacting objects into an image that
//! can be loaded onto a many-core machine with strict per-core memory and
//! connectivity limits. It:
//!
//! - partitions every object into slices that fit a core's budgets,
//! - assigns every stream a routing key from a hierarchical bit-field
//!   keyspace,
//! - renders the byte-level memory image of each placed slice and the plan
//!   used to load it.
//!
//! Placement, routing table generation and the device loader itself live
//! outside this crate.
//!
//! ## Feature Flags
//!
//! - **`parallel`** (default): partition vertices on the rayon thread pool
//! - **`file-logging`**: also write logs to a daily-rotated file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spinn::prelude::*;
//!
//! let mut objects = ObjectRegistry::new();
//! objects.insert(NetworkObject::new(ObjectId(0), "in", ObjectKind::Filter, 2, 2))?;
//! objects.insert(NetworkObject::new(ObjectId(1), "out", ObjectKind::Filter, 2, 2))?;
//! let connections = vec![Connection::new(ObjectId(0), ObjectId(1))];
//!
//! let context = CompilationContext::new(SpinnConfig::default())?
//!     .with_assembler(ObjectKind::Filter, ValueFilterAssembler::default());
//! let compiled = context.compile(&objects, &connections)?;
//!
//! // One core per split vertex, handed out by the placement layer
//! let placements: Vec<Placement> = compiled
//!     .iter_split_vertices()
//!     .enumerate()
//!     .map(|(p, split_vertex)| Placement { x: 0, y: 0, p: p as u32 + 1, split_vertex: *split_vertex })
//!     .collect();
//! let plan = context.generate(&compiled, &placements, |_, _, p| 0xE510_0000 + 0x80 * p)?;
//! println!("{} region writes", plan.region_writes.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: spinn-config, spinn-observability,         │
//! │              spinn-structures                           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: spinn-keyspace, spinn-connectivity,        │
//! │              spinn-partitioning                         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Output: spinn-memory                                   │
//! │  (regions, pointer tables, load plans)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use spinn_config as config;
pub use spinn_observability as observability;
pub use spinn_structures as structures;

// Re-export algorithms
pub use spinn_connectivity as connectivity;
pub use spinn_keyspace as keyspace;
pub use spinn_partitioning as partitioning;

// Re-export output
pub use spinn_memory as memory;

pub mod assembler;
pub mod compilation;
pub mod error;
pub mod value_filter;
pub mod vertex;

pub use assembler::{get_keyspaces_with_dimensions, AssemblyContext, VertexAssembler};
pub use compilation::{CompilationContext, CompiledNetwork, NetworkTransform, Placement, MANIFEST_FILE_NAME};
pub use error::{SpinnError, SpinnResult};
pub use value_filter::ValueFilterAssembler;
pub use vertex::RegionedVertex;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::assembler::{AssemblyContext, VertexAssembler};
    pub use crate::compilation::{CompilationContext, CompiledNetwork, NetworkTransform, Placement};
    pub use crate::error::{SpinnError, SpinnResult};
    pub use crate::value_filter::ValueFilterAssembler;
    pub use crate::vertex::RegionedVertex;

    pub use crate::config::SpinnConfig;
    pub use crate::connectivity::{Connection, ConnectionTree, Port, Synapse};
    pub use crate::keyspace::{FieldSpec, Keyspace};
    pub use crate::memory::{LoadPlan, Region, Subregion};
    pub use crate::partitioning::{Constraint, SplitVertex, Vertex};
    pub use crate::structures::{NetworkObject, ObjectId, ObjectKind, ObjectRegistry, Slice, Transform};
}
