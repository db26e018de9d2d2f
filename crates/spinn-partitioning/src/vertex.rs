// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use spinn_structures::{ObjectId, Slice};
use std::fmt::{Display, Formatter};

/// A unit of work that can be split across cores by atom.
///
/// Usage must be defined for every contiguous sub-range of the vertex's
/// atoms. It is expected, not checked, to grow with the slice width.
pub trait Vertex: Send + Sync {
    fn id(&self) -> ObjectId;

    fn label(&self) -> &str;

    fn n_atoms(&self) -> usize;

    /// CPU cycles per timestep
    fn cpu_usage(&self, slice: Slice) -> u64;

    /// Bytes of core-local memory
    fn dtcm_usage(&self, slice: Slice) -> u64;

    /// Bytes of shared node memory
    fn sdram_usage(&self, slice: Slice) -> u64;
}

/// The part of a vertex placed on one core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SplitVertex {
    pub vertex: ObjectId,
    pub slice: Slice,
}

impl Display for SplitVertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}:{}]", self.vertex, self.slice.start(), self.slice.stop())
    }
}
