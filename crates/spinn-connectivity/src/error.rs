// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_keyspace::KeyspaceError;
use spinn_structures::SpinnDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// A synapse, learning rule or connection shape the compiler cannot map
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),

    #[error(transparent)]
    Data(#[from] SpinnDataError),
}

pub type ConnectivityResult<T> = Result<T, ConnectivityError>;
