// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyspaceError {
    /// Field definitions collide, or a field cannot be placed
    #[error("Field conflict: {0}")]
    FieldConflict(String),

    /// A field value cannot be bound
    #[error("Binding error: {0}")]
    Binding(String),

    /// A key was requested while fields it needs are unbound
    #[error("Cannot generate key with undefined fields {}", .missing.join(", "))]
    Incomplete { missing: Vec<String> },

    #[error("Field '{0}' does not exist")]
    UnknownField(String),

    #[error("Field '{field}' requires that {requirements}")]
    FieldUnavailable { field: String, requirements: String },

    #[error("Tag '{0}' does not exist")]
    UnknownTag(String),

    #[error("Invalid keyspace width {0}, must be 1..=64 bits")]
    InvalidWidth(u32),
}

pub type KeyspaceResult<T> = Result<T, KeyspaceError>;
