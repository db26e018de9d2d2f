// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_structures::{ObjectId, SpinnDataError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartitionError {
    /// Even one atom per slice violates a constraint
    #[error("Cannot partition '{label}': {n_atoms} atoms would need {required} slices")]
    Infeasible {
        label: String,
        n_atoms: usize,
        required: usize,
    },

    #[error("Edge refers to vertex {0} which has not been partitioned")]
    UnknownVertex(ObjectId),

    #[error(transparent)]
    Data(#[from] SpinnDataError),
}

pub type PartitionResult<T> = Result<T, PartitionError>;
