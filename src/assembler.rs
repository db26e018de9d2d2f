// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Building vertices from network objects.
//!
//! One assembler is registered per [`ObjectKind`]. It sees the object and
//! the final connection tree and returns the vertex to partition, or
//! `None` when the object needs no core of its own.

use spinn_config::SpinnConfig;
use spinn_connectivity::{ConnectionTree, IncomingConnections, OutgoingConnections, OutgoingReducedConnection};
use spinn_keyspace::{Keyspace, DIMENSION_FIELD};
use spinn_memory::WordFormatter;
use spinn_structures::{NetworkObject, ObjectId};

use crate::error::{SpinnError, SpinnResult};
use crate::vertex::RegionedVertex;

/// What an assembler can see of the compilation.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub tree: &'a ConnectionTree,
    pub config: &'a SpinnConfig,
    pub formatter: WordFormatter,
}

impl<'a> AssemblyContext<'a> {
    pub fn outgoing(&self, object: ObjectId) -> OutgoingConnections {
        self.tree.get_outgoing_connections(object)
    }

    pub fn incoming(&self, object: ObjectId) -> IncomingConnections {
        self.tree.get_incoming_connections(object)
    }

    /// Simulation timestep in seconds
    pub fn dt(&self) -> f64 {
        f64::from(self.config.application.timer_period) * 1e-6
    }
}

pub trait VertexAssembler: Send + Sync {
    fn assemble(&self, object: &NetworkObject, context: &AssemblyContext<'_>) -> SpinnResult<Option<RegionedVertex>>;
}

impl<F> VertexAssembler for F
where
    F: Fn(&NetworkObject, &AssemblyContext<'_>) -> SpinnResult<Option<RegionedVertex>> + Send + Sync,
{
    fn assemble(&self, object: &NetworkObject, context: &AssemblyContext<'_>) -> SpinnResult<Option<RegionedVertex>> {
        self(object, context)
    }
}

/// One keyspace per transmitted value: every connection's keyspace bound
/// with each of its dimensions, in connection order.
pub fn get_keyspaces_with_dimensions<'a, I>(origin: ObjectId, connections: I) -> SpinnResult<Vec<Keyspace>>
where
    I: IntoIterator<Item = &'a OutgoingReducedConnection>,
{
    let mut keyspaces = Vec::new();
    for connection in connections {
        let keyspace = connection
            .keyspace
            .as_ref()
            .ok_or(SpinnError::UnkeyedConnection { object: origin })?;
        for d in 0..connection.width {
            keyspaces.push(keyspace.bind([(DIMENSION_FIELD, d as u64)])?);
        }
    }
    Ok(keyspaces)
}
