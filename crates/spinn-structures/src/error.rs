// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for the core value types.
///
/// # Examples
/// ```
/// use spinn_structures::{Slice, SpinnDataError};
///
/// assert!(matches!(Slice::new(4, 4), Err(SpinnDataError::BadParameters(_))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SpinnDataError {
    /// Invalid parameters provided to a function
    BadParameters(String),
    /// Two shapes that must agree do not
    ShapeMismatch {
        context: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Internal error indicating a bug
    InternalError(String),
}

impl Display for SpinnDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinnDataError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            SpinnDataError::ShapeMismatch {
                context,
                expected,
                found,
            } => write!(
                f,
                "Shape mismatch in {}: expected {}x{}, found {}x{}",
                context, expected.0, expected.1, found.0, found.1
            ),
            SpinnDataError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl Error for SpinnDataError {}

pub type SpinnDataResult<T> = Result<T, SpinnDataError>;
