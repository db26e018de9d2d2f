// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ready-made key layouts.

use crate::error::KeyspaceResult;
use crate::field::FieldSpec;
use crate::keyspace::Keyspace;

/// Tag carried by every field the routers match on
pub const ROUTING_TAG: &str = "routing";
/// Tag of the fields a receiver matches on to pick the filter for a stream
pub const FILTER_ROUTING_TAG: &str = "filter_routing";

/// Field bound to the index of the originating object
pub const OBJECT_FIELD: &str = "o";
/// Field bound to the index of a connection leaving that object
pub const CONNECTION_FIELD: &str = "i";
/// Field filled with the physical sub-vertex index when keys are rendered
pub const SUBVERTEX_FIELD: &str = "s";
/// Field filled with the dimension index of a transmitted value
pub const DIMENSION_FIELD: &str = "d";

impl Keyspace {
    /// Fixed 32-bit layout, most significant field first:
    /// `x:8 | y:8 | p:5 | i:5 | d:6`, with `x, y, p, i` tagged for routing.
    ///
    /// ```
    /// use spinn_keyspace::Keyspace;
    ///
    /// let ks = Keyspace::standard().unwrap();
    /// let k = ks.bind([("x", 5), ("y", 3), ("p", 2), ("i", 1), ("d", 7)]).unwrap();
    /// assert_eq!(k.key().unwrap(), (5 << 24) | (3 << 16) | (2 << 11) | (1 << 6) | 7);
    /// assert_eq!(k.routing_key().unwrap(), (5 << 24) | (3 << 16) | (2 << 11) | (1 << 6));
    /// ```
    pub fn standard() -> KeyspaceResult<Keyspace> {
        let ks = Keyspace::new(32)?;
        ks.add_field(FieldSpec::new("x").length(8).start_at(24).tag(ROUTING_TAG))?;
        ks.add_field(FieldSpec::new("y").length(8).start_at(16).tag(ROUTING_TAG))?;
        ks.add_field(FieldSpec::new("p").length(5).start_at(11).tag(ROUTING_TAG))?;
        ks.add_field(FieldSpec::new("i").length(5).start_at(6).tag(ROUTING_TAG))?;
        ks.add_field(FieldSpec::new("d").length(6).start_at(0))?;
        Ok(ks)
    }

    /// Layout used for connections without an explicit keyspace.
    ///
    /// `o` and `i` also carry [`FILTER_ROUTING_TAG`], so a receiver can
    /// tell streams apart whichever sub-vertex sent them.
    ///
    /// `d` and `s` are fixed in the low bits because they are bound while
    /// regions are rendered, after the layout has been frozen. `o` and `i`
    /// are sized from the bindings made when default keyspaces are applied
    /// and packed above them.
    pub fn connection_default(width: u32, subvertex_bits: u32, dimension_bits: u32) -> KeyspaceResult<Keyspace> {
        let ks = Keyspace::new(width)?;
        ks.add_field(FieldSpec::new(DIMENSION_FIELD).length(dimension_bits).start_at(0))?;
        ks.add_field(
            FieldSpec::new(SUBVERTEX_FIELD)
                .length(subvertex_bits)
                .start_at(dimension_bits)
                .tag(ROUTING_TAG),
        )?;
        ks.add_field(FieldSpec::new(CONNECTION_FIELD).tag(ROUTING_TAG).tag(FILTER_ROUTING_TAG))?;
        ks.add_field(FieldSpec::new(OBJECT_FIELD).tag(ROUTING_TAG).tag(FILTER_ROUTING_TAG))?;
        Ok(ks)
    }

    /// Key of all enabled fields
    pub fn key(&self) -> KeyspaceResult<u64> {
        self.get_key(None)
    }

    pub fn mask(&self) -> KeyspaceResult<u64> {
        self.get_mask(None)
    }

    /// Key of the routing fields only
    pub fn routing_key(&self) -> KeyspaceResult<u64> {
        self.get_key(Some(ROUTING_TAG))
    }

    pub fn routing_mask(&self) -> KeyspaceResult<u64> {
        self.get_mask(Some(ROUTING_TAG))
    }
}
