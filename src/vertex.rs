// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Vertices described by their memory regions.

use spinn_memory::{MemoryResult, Region, Subregion};
use spinn_partitioning::Vertex;
use spinn_structures::{ObjectId, Slice};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type CpuUsageFn = dyn Fn(Slice) -> u64 + Send + Sync;

/// A vertex whose memory usage is the size of its regions.
///
/// Regions keep their position: an empty entry still takes an index in the
/// core's pointer table.
#[derive(Clone)]
pub struct RegionedVertex {
    id: ObjectId,
    label: String,
    n_atoms: usize,
    regions: Vec<Option<Arc<dyn Region>>>,
    cpu_usage: Option<Arc<CpuUsageFn>>,
}

impl RegionedVertex {
    pub fn new(id: ObjectId, label: impl Into<String>, n_atoms: usize) -> Self {
        RegionedVertex {
            id,
            label: label.into(),
            n_atoms,
            regions: Vec::new(),
            cpu_usage: None,
        }
    }

    pub fn with_region(mut self, region: impl Region + 'static) -> Self {
        self.regions.push(Some(Arc::new(region)));
        self
    }

    /// Reserve a pointer table index without any memory behind it
    pub fn with_empty_region(mut self) -> Self {
        self.regions.push(None);
        self
    }

    /// CPU cycles per timestep for a slice; zero when not given
    pub fn with_cpu_usage<F>(mut self, cpu_usage: F) -> Self
    where
        F: Fn(Slice) -> u64 + Send + Sync + 'static,
    {
        self.cpu_usage = Some(Arc::new(cpu_usage));
        self
    }

    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    /// Render every region for `slice`, the `subvertex_index`-th split of
    /// this vertex
    pub fn render(&self, slice: Slice, subvertex_index: usize) -> MemoryResult<Vec<Option<Subregion>>> {
        self.regions
            .iter()
            .map(|region| {
                region
                    .as_ref()
                    .map(|r| r.create_subregion(slice, subvertex_index))
                    .transpose()
            })
            .collect()
    }

    fn region_bytes<P>(&self, slice: Slice, include: P) -> u64
    where
        P: Fn(&dyn Region) -> bool,
    {
        self.regions
            .iter()
            .flatten()
            .filter(|r| include(r.as_ref()))
            .map(|r| 4 * r.sizeof(slice) as u64)
            .sum()
    }
}

impl Vertex for RegionedVertex {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    fn cpu_usage(&self, slice: Slice) -> u64 {
        self.cpu_usage.as_ref().map_or(0, |usage| usage(slice))
    }

    fn dtcm_usage(&self, slice: Slice) -> u64 {
        self.region_bytes(slice, |r| r.in_dtcm())
    }

    fn sdram_usage(&self, slice: Slice) -> u64 {
        self.region_bytes(slice, |_| true)
    }
}

impl Debug for RegionedVertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionedVertex")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("n_atoms", &self.n_atoms)
            .field("n_regions", &self.regions.len())
            .finish()
    }
}
