// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Linear transforms applied along connections.
//!
//! [`TransformMatrix`] compares and hashes by content so it can take part in
//! the keys that decide whether two connections share one outgoing route.

use ndarray::{Array1, Array2};
use std::hash::{Hash, Hasher};

use crate::error::{SpinnDataError, SpinnDataResult};
use crate::slice::Slice;

/// Dense `rows x cols` matrix with content equality.
///
/// Rows index post-object dimensions, columns pre-object dimensions.
#[derive(Debug, Clone)]
pub struct TransformMatrix {
    values: Array2<f64>,
}

/// Bit pattern used for equality; all zeros and all NaNs collapse to one
/// pattern each.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

impl TransformMatrix {
    pub fn new(values: Array2<f64>) -> Self {
        TransformMatrix { values }
    }

    pub fn identity(n: usize) -> Self {
        TransformMatrix::new(Array2::eye(n))
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> SpinnDataResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(SpinnDataError::ShapeMismatch {
                    context: format!("row {} of transform", i),
                    expected: (1, n_cols),
                    found: (1, row.len()),
                });
            }
            flat.extend_from_slice(row);
        }
        Array2::from_shape_vec((n_rows, n_cols), flat)
            .map(TransformMatrix::new)
            .map_err(|e| SpinnDataError::InternalError(e.to_string()))
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Number of post-object dimensions written
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of pre-object dimensions read
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        TransformMatrix::new(&self.values * factor)
    }

    /// The single value shared by every element, if there is one
    pub fn uniform_value(&self) -> Option<f64> {
        let first = *self.values.iter().next()?;
        self.values
            .iter()
            .all(|v| canonical_bits(*v) == canonical_bits(first))
            .then_some(first)
    }

    /// Apply to a vector of pre-object values
    pub fn apply(&self, input: &Array1<f64>) -> SpinnDataResult<Array1<f64>> {
        if input.len() != self.n_cols() {
            return Err(SpinnDataError::ShapeMismatch {
                context: "transform input".to_string(),
                expected: (self.n_cols(), 1),
                found: (input.len(), 1),
            });
        }
        Ok(self.values.dot(input))
    }
}

impl PartialEq for TransformMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| canonical_bits(*a) == canonical_bits(*b))
    }
}

impl Eq for TransformMatrix {}

impl Hash for TransformMatrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape().hash(state);
        for value in self.values.iter() {
            canonical_bits(*value).hash(state);
        }
    }
}

/// Evaluation points or function samples, compared by content like
/// transforms
pub type SampleMatrix = TransformMatrix;

/// A transform as written on a front-end connection, before expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Scalar(f64),
    Diagonal(Vec<f64>),
    /// `post_slice.n_atoms() x pre_slice.n_atoms()`
    Dense(Array2<f64>),
}

impl Transform {
    /// Expand into the full `post_size_in x pre_size_out` matrix, placing
    /// the transform at the selected post rows and pre columns.
    pub fn full(
        &self,
        pre_size_out: usize,
        post_size_in: usize,
        pre_slice: Slice,
        post_slice: Slice,
    ) -> SpinnDataResult<TransformMatrix> {
        if pre_slice.stop() > pre_size_out || post_slice.stop() > post_size_in {
            return Err(SpinnDataError::BadParameters(format!(
                "{} / {} exceed object sizes {} / {}",
                pre_slice, post_slice, pre_size_out, post_size_in
            )));
        }

        let n_pre = pre_slice.n_atoms();
        let n_post = post_slice.n_atoms();
        let mut full = Array2::<f64>::zeros((post_size_in, pre_size_out));

        match self {
            Transform::Scalar(k) => {
                if n_pre != n_post {
                    return Err(SpinnDataError::ShapeMismatch {
                        context: "scalar transform slices".to_string(),
                        expected: (n_post, n_post),
                        found: (n_post, n_pre),
                    });
                }
                for (i, j) in post_slice.as_range().zip(pre_slice.as_range()) {
                    full[[i, j]] = *k;
                }
            }
            Transform::Diagonal(diag) => {
                if n_pre != n_post || diag.len() != n_pre {
                    return Err(SpinnDataError::ShapeMismatch {
                        context: "diagonal transform".to_string(),
                        expected: (n_post, n_pre),
                        found: (diag.len(), diag.len()),
                    });
                }
                for ((i, j), value) in post_slice.as_range().zip(pre_slice.as_range()).zip(diag) {
                    full[[i, j]] = *value;
                }
            }
            Transform::Dense(matrix) => {
                if matrix.dim() != (n_post, n_pre) {
                    return Err(SpinnDataError::ShapeMismatch {
                        context: "dense transform".to_string(),
                        expected: (n_post, n_pre),
                        found: matrix.dim(),
                    });
                }
                for (r, i) in post_slice.as_range().enumerate() {
                    for (c, j) in pre_slice.as_range().enumerate() {
                        full[[i, j]] = matrix[[r, c]];
                    }
                }
            }
        }

        Ok(TransformMatrix::new(full))
    }
}
