// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Functions computed along connections.

use ndarray::Array2;
use spinn_structures::{SampleMatrix, Slice};
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ConnectivityError, ConnectivityResult};

type VectorFn = dyn Fn(&[f64]) -> Vec<f64> + Send + Sync;

/// Shared handle to a vector function with a known output size.
///
/// Two handles are equal only when they point at the same function;
/// cloning a handle keeps that identity.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    size_out: usize,
    func: Arc<VectorFn>,
}

impl FunctionRef {
    pub fn new<F>(name: impl Into<String>, size_out: usize, func: F) -> Self
    where
        F: Fn(&[f64]) -> Vec<f64> + Send + Sync + 'static,
    {
        FunctionRef {
            name: name.into(),
            size_out,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_out(&self) -> usize {
        self.size_out
    }

    pub fn call(&self, input: &[f64]) -> Vec<f64> {
        (self.func)(input)
    }

    /// Apply to the `slice` columns of every row of `points`
    pub fn evaluate(&self, points: &Array2<f64>, slice: Slice) -> ConnectivityResult<SampleMatrix> {
        let mut samples = Array2::<f64>::zeros((points.nrows(), self.size_out));
        for (n, row) in points.rows().into_iter().enumerate() {
            let input: Vec<f64> = slice.as_range().map(|c| row[c]).collect();
            let output = self.call(&input);
            if output.len() != self.size_out {
                return Err(ConnectivityError::InvalidConnection(format!(
                    "Function '{}' returned {} values, expected {}",
                    self.name,
                    output.len(),
                    self.size_out
                )));
            }
            for (c, value) in output.into_iter().enumerate() {
                samples[[n, c]] = value;
            }
        }
        Ok(SampleMatrix::new(samples))
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.func) as *const () as usize
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Eq for FunctionRef {}

impl Hash for FunctionRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl Debug for FunctionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FunctionRef({}, size_out={})", self.name, self.size_out)
    }
}
