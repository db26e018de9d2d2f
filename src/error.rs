// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_config::ConfigError;
use spinn_connectivity::ConnectivityError;
use spinn_keyspace::KeyspaceError;
use spinn_memory::MemoryError;
use spinn_partitioning::PartitionError;
use spinn_structures::{ObjectId, ObjectKind, SpinnDataError};

/// Any failure of a compilation, wrapping the error of the stage it came
/// from.
#[derive(Debug, thiserror::Error)]
pub enum SpinnError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Data(#[from] SpinnDataError),

    /// No assembler is registered for the kind of `label`
    #[error("Unsupported object kind {kind:?} for '{label}'")]
    UnsupportedObjectKind { kind: ObjectKind, label: String },

    /// A connection reached a vertex without a keyspace
    #[error("Connection received by {object} has no keyspace")]
    UnkeyedConnection { object: ObjectId },

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),
}

pub type SpinnResult<T> = Result<T, SpinnError>;
