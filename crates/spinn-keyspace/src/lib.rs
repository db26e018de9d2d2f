// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spinn-keyspace

Routing keys built from named bit-fields. See [`Keyspace`] for the model:
a shared field registry, immutable value bindings, conditional fields and
deferred sizing/placement.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod field;
pub mod keyspace;
pub mod standard;

pub use error::{KeyspaceError, KeyspaceResult};
pub use field::{Field, FieldSpec};
pub use keyspace::Keyspace;
pub use standard::{
    CONNECTION_FIELD, DIMENSION_FIELD, FILTER_ROUTING_TAG, OBJECT_FIELD, ROUTING_TAG, SUBVERTEX_FIELD,
};
