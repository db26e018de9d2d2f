// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_keyspace::KeyspaceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Attempted to request {requested}B of memory, only {available}B are available")]
    InsufficientMemory { requested: u64, available: u64 },

    /// A rendered key does not fit a 32-bit word
    #[error("Key {key:#x} from {keyspace} does not fit in a 32-bit word")]
    KeyTooWide { key: u64, keyspace: String },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialise load plan: {0}")]
    Manifest(#[from] serde_json::Error),
}

pub type MemoryResult<T> = Result<T, MemoryError>;
