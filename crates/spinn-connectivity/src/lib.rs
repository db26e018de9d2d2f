// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# spinn-connectivity

Reduction of front-end connections into the form the compiler works with.

A [`Connection`] is expanded to an [`IntermediateConnection`] (full
transform, resolved evaluation points), which splits into an
[`OutgoingReducedConnection`] describing what the sender transmits and an
[`IncomingReducedConnection`] describing how the receiver filters it. The
[`ConnectionTree`] groups these per originating object, merging outgoing
connections that are interchangeable.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod filter;
pub mod function;
pub mod intermediate;
pub mod learning;
pub mod reduced;
pub mod transforms;
pub mod tree;

pub use error::{ConnectivityError, ConnectivityResult};
pub use filter::{combine_filters, FilterParameter, Synapse};
pub use function::FunctionRef;
pub use intermediate::{Connection, IntermediateConnection, DEFAULT_SYNAPSE_TAU};
pub use learning::{LearningRule, LearningRuleId};
pub use reduced::{IncomingReducedConnection, OutgoingReducedConnection, Port, ReducedSource, Solver, Target};
pub use transforms::TransformCollection;
pub use tree::{ConnectionTree, Edge, IncomingConnections, OutgoingConnections};
