// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The connection tree: originating object -> outgoing connection ->
//! incoming connections.
//!
//! Outgoing connections that compare equal are merged, so one transmitted
//! stream can feed every receiver listed under it. Trees are never
//! modified in place; each transformation returns a new tree.

use indexmap::{IndexMap, IndexSet};
use spinn_keyspace::{Keyspace, CONNECTION_FIELD, OBJECT_FIELD};
use spinn_structures::ObjectId;
use tracing::{debug, info};

use crate::error::ConnectivityResult;
use crate::filter::FilterParameter;
use crate::intermediate::IntermediateConnection;
use crate::reduced::{IncomingReducedConnection, OutgoingReducedConnection, Port};

/// Outgoing connections of one object and the receivers of each
pub type OutgoingConnections = IndexMap<OutgoingReducedConnection, Vec<IncomingReducedConnection>>;

/// Receivers of one object grouped by port then filter, holding the
/// keyspace of each stream that arrives there
pub type IncomingConnections = IndexMap<Port, IndexMap<FilterParameter, Vec<Option<Keyspace>>>>;

/// One stream between two objects
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub pre: ObjectId,
    pub post: ObjectId,
    pub keyspace: Option<Keyspace>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionTree {
    connections: IndexMap<ObjectId, OutgoingConnections>,
}

impl ConnectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_intermediate_connections<'a, I>(connections: I) -> ConnectivityResult<Self>
    where
        I: IntoIterator<Item = &'a IntermediateConnection>,
    {
        let mut tree = ConnectionTree::new();
        let mut n_connections = 0usize;
        for connection in connections {
            let outgoing = connection.get_reduced_outgoing_connection()?;
            let incoming = connection.get_reduced_incoming_connection()?;
            tree.insert(connection.pre_obj, outgoing, incoming);
            n_connections += 1;
        }
        info!(
            target: "spinn-connectivity",
            "Reduced {} connections into {} outgoing streams from {} objects",
            n_connections,
            tree.n_outgoing(),
            tree.connections.len()
        );
        Ok(tree)
    }

    fn insert(&mut self, origin: ObjectId, outgoing: OutgoingReducedConnection, incoming: IncomingReducedConnection) {
        self.connections
            .entry(origin)
            .or_default()
            .entry(outgoing)
            .or_default()
            .push(incoming);
    }

    fn n_outgoing(&self) -> usize {
        self.connections.values().map(IndexMap::len).sum()
    }

    /// `(origin, outgoing, incoming)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &OutgoingReducedConnection, &[IncomingReducedConnection])> {
        self.connections.iter().flat_map(|(origin, outgoing)| {
            outgoing
                .iter()
                .map(move |(conn, incoming)| (*origin, conn, incoming.as_slice()))
        })
    }

    pub fn get_originating_objects(&self) -> IndexSet<ObjectId> {
        self.connections.keys().copied().collect()
    }

    pub fn get_terminating_objects(&self) -> IndexSet<ObjectId> {
        self.iter()
            .flat_map(|(_, _, incoming)| incoming.iter().map(|c| c.target.object))
            .collect()
    }

    /// Every object in the tree, originating objects first
    pub fn get_objects(&self) -> IndexSet<ObjectId> {
        let mut objects = self.get_originating_objects();
        objects.extend(self.get_terminating_objects());
        objects
    }

    /// Outgoing connections of `object` and their receivers; empty when the
    /// object transmits nothing
    pub fn get_outgoing_connections(&self, object: ObjectId) -> OutgoingConnections {
        self.connections.get(&object).cloned().unwrap_or_default()
    }

    pub fn get_incoming_connections(&self, object: ObjectId) -> IncomingConnections {
        let mut incoming = IncomingConnections::new();
        for (_, outgoing, receivers) in self.iter() {
            for receiver in receivers.iter().filter(|r| r.target.object == object) {
                incoming
                    .entry(receiver.target.port)
                    .or_default()
                    .entry(receiver.filter)
                    .or_default()
                    .push(outgoing.keyspace.clone());
            }
        }
        incoming
    }

    /// Copy the tree, substituting objects found in `replacements`.
    ///
    /// Substitution happens at the originating end when
    /// `replace_when_originating` is set and at the receiving end when
    /// `replace_when_terminating` is set.
    pub fn get_new_tree_with_replaced_objects(
        &self,
        replacements: &IndexMap<ObjectId, ObjectId>,
        replace_when_originating: bool,
        replace_when_terminating: bool,
    ) -> ConnectionTree {
        let substitute = |object: ObjectId, enabled: bool| -> ObjectId {
            match replacements.get(&object) {
                Some(replacement) if enabled => *replacement,
                _ => object,
            }
        };

        let mut tree = ConnectionTree::new();
        for (origin, outgoing, receivers) in self.iter() {
            let origin = substitute(origin, replace_when_originating);
            for receiver in receivers {
                let mut receiver = receiver.clone();
                receiver.target.object = substitute(receiver.target.object, replace_when_terminating);
                tree.insert(origin, outgoing.clone(), receiver);
            }
        }
        debug!(
            target: "spinn-connectivity",
            "Replaced {} objects in connection tree",
            replacements.len()
        );
        tree
    }

    /// Copy the tree, giving every connection without a keyspace
    /// `default_keyspace` bound with the index of its origin object (`o`)
    /// and its own index among that object's connections (`i`).
    pub fn get_new_tree_with_applied_keyspace(&self, default_keyspace: &Keyspace) -> ConnectivityResult<ConnectionTree> {
        let mut tree = ConnectionTree::new();
        for (o, (origin, outgoing)) in self.connections.iter().enumerate() {
            for (i, (connection, receivers)) in outgoing.iter().enumerate() {
                let connection = match connection.keyspace {
                    Some(_) => connection.clone(),
                    None => {
                        let keyspace = default_keyspace
                            .bind([(OBJECT_FIELD, o as u64)])?
                            .bind([(CONNECTION_FIELD, i as u64)])?;
                        connection.with_keyspace(keyspace)
                    }
                };
                for receiver in receivers {
                    tree.insert(*origin, connection.clone(), receiver.clone());
                }
            }
        }
        Ok(tree)
    }

    /// One edge per (outgoing, incoming) pair, duplicates included
    pub fn get_folded_edges(&self) -> Vec<Edge> {
        self.iter()
            .flat_map(|(origin, outgoing, receivers)| {
                receivers.iter().map(move |receiver| Edge {
                    pre: origin,
                    post: receiver.target.object,
                    keyspace: outgoing.keyspace.clone(),
                })
            })
            .collect()
    }
}
