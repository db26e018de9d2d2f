// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Vertex partitioning and edge splitting.

Each vertex is partitioned on its own: starting from one slice, the split
count grows until every constraint is met on every slice. The growth step
increases on every retry so vertices whose usage has a fixed per-slice
overhead still converge, and the count never passes one atom per slice.
*/

use indexmap::IndexMap;
use serde::Serialize;
use spinn_connectivity::Edge;
use spinn_keyspace::Keyspace;
use spinn_structures::{ObjectId, Slice};
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::constraint::Constraint;
use crate::error::{PartitionError, PartitionResult};
use crate::vertex::{SplitVertex, Vertex};

/// Slices of each vertex, in input order
pub type Partitions = IndexMap<ObjectId, Vec<Slice>>;

/// Split vertices of each vertex, in input order
pub type SplitVertices = IndexMap<ObjectId, Vec<SplitVertex>>;

/// An edge between two split vertices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SplitEdge {
    pub pre: SplitVertex,
    pub post: SplitVertex,
    #[serde(skip)]
    pub keyspace: Option<Keyspace>,
}

/// Find the smallest split of `vertex` this search reaches in which every
/// slice satisfies every constraint.
pub fn partition_vertex<V: Vertex>(vertex: &V, constraints: &[Constraint]) -> PartitionResult<Vec<Slice>> {
    let full = Slice::full(vertex.n_atoms())?;
    let mut n_splits = 1usize;
    let mut increment = 0usize;

    loop {
        let slices = full.split_into(n_splits)?;
        let required = slices
            .iter()
            .flat_map(|slice| constraints.iter().map(move |c| c.required_splits(vertex, *slice)))
            .max()
            .unwrap_or(1);
        trace!(
            target: "spinn-partitioning",
            "'{}' in {} slices needs {} splits",
            vertex.label(),
            n_splits,
            required
        );

        if required <= 1 {
            debug!(
                target: "spinn-partitioning",
                "Partitioned '{}' ({} atoms) into {} slices",
                vertex.label(),
                vertex.n_atoms(),
                slices.len()
            );
            return Ok(slices);
        }

        if required > vertex.n_atoms() || n_splits == vertex.n_atoms() {
            return Err(PartitionError::Infeasible {
                label: vertex.label().to_string(),
                n_atoms: vertex.n_atoms(),
                required,
            });
        }

        increment += 1;
        n_splits = required
            .max(n_splits.saturating_add(increment))
            .min(vertex.n_atoms());
    }
}

/// Partition every vertex. Any failure aborts the whole partitioning.
pub fn partition_vertices<V: Vertex>(vertices: &[V], constraints: &[Constraint]) -> PartitionResult<Partitions> {
    #[cfg(feature = "parallel")]
    let results: Vec<(ObjectId, Vec<Slice>)> = vertices
        .par_iter()
        .map(|v| partition_vertex(v, constraints).map(|slices| (v.id(), slices)))
        .collect::<PartitionResult<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(ObjectId, Vec<Slice>)> = vertices
        .iter()
        .map(|v| partition_vertex(v, constraints).map(|slices| (v.id(), slices)))
        .collect::<PartitionResult<Vec<_>>>()?;

    let partitions: Partitions = results.into_iter().collect();
    info!(
        target: "spinn-partitioning",
        "Partitioned {} vertices into {} slices",
        partitions.len(),
        partitions.values().map(Vec::len).sum::<usize>()
    );
    Ok(partitions)
}

pub fn get_split_vertices(partitions: &Partitions) -> SplitVertices {
    partitions
        .iter()
        .map(|(vertex, slices)| {
            let split = slices
                .iter()
                .map(|slice| SplitVertex {
                    vertex: *vertex,
                    slice: *slice,
                })
                .collect();
            (*vertex, split)
        })
        .collect()
}

/// Every edge paired with the edges between each pre and each post split
/// vertex.
pub fn get_split_edges(edges: &[Edge], split_vertices: &SplitVertices) -> PartitionResult<Vec<(Edge, Vec<SplitEdge>)>> {
    let lookup = |vertex: ObjectId| {
        split_vertices
            .get(&vertex)
            .ok_or(PartitionError::UnknownVertex(vertex))
    };

    edges
        .iter()
        .map(|edge| {
            let pres = lookup(edge.pre)?;
            let posts = lookup(edge.post)?;
            let split_edges = pres
                .iter()
                .flat_map(|pre| {
                    posts.iter().map(move |post| SplitEdge {
                        pre: *pre,
                        post: *post,
                        keyspace: edge.keyspace.clone(),
                    })
                })
                .collect();
            Ok((edge.clone(), split_edges))
        })
        .collect()
}
