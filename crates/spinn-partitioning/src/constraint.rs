// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Resource constraints: how many pieces a slice must be cut into.

use spinn_structures::Slice;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::vertex::Vertex;

type SplitFn = dyn Fn(&dyn Vertex, Slice) -> usize + Send + Sync;

/// Number of splits a slice of a vertex needs; `1` (or `0`) means it fits.
#[derive(Clone)]
pub struct Constraint {
    name: String,
    required_splits: Arc<SplitFn>,
}

impl Constraint {
    pub fn custom<F>(name: impl Into<String>, required_splits: F) -> Self
    where
        F: Fn(&dyn Vertex, Slice) -> usize + Send + Sync + 'static,
    {
        Constraint {
            name: name.into(),
            required_splits: Arc::new(required_splits),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_splits(&self, vertex: &dyn Vertex, slice: Slice) -> usize {
        (self.required_splits)(vertex, slice)
    }

    /// CPU cycles per step limited to `fraction` of `limit`
    pub fn max_cpu(limit: u64, fraction: f64) -> Self {
        Self::usage_limit("max_cpu", limit, fraction, |v, s| v.cpu_usage(s))
    }

    pub fn max_dtcm(limit: u64, fraction: f64) -> Self {
        Self::usage_limit("max_dtcm", limit, fraction, |v, s| v.dtcm_usage(s))
    }

    pub fn max_sdram(limit: u64, fraction: f64) -> Self {
        Self::usage_limit("max_sdram", limit, fraction, |v, s| v.sdram_usage(s))
    }

    /// At most `n` atoms per slice
    pub fn max_atoms(n: usize) -> Self {
        Constraint::custom(format!("max_atoms({})", n), move |_, slice| {
            slice.n_atoms().div_ceil(n.max(1))
        })
    }

    fn usage_limit<U>(name: &str, limit: u64, fraction: f64, usage: U) -> Self
    where
        U: Fn(&dyn Vertex, Slice) -> u64 + Send + Sync + 'static,
    {
        let budget = limit as f64 * fraction;
        Constraint::custom(format!("{}({}, {})", name, limit, fraction), move |vertex, slice| {
            let used = usage(vertex, slice) as f64;
            if used <= budget {
                1
            } else if budget <= 0.0 {
                usize::MAX
            } else {
                (used / budget).ceil() as usize
            }
        })
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Constraint({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinn_structures::ObjectId;

    struct Linear;

    impl Vertex for Linear {
        fn id(&self) -> ObjectId {
            ObjectId(0)
        }
        fn label(&self) -> &str {
            "linear"
        }
        fn n_atoms(&self) -> usize {
            100
        }
        fn cpu_usage(&self, slice: Slice) -> u64 {
            10 * slice.n_atoms() as u64
        }
        fn dtcm_usage(&self, slice: Slice) -> u64 {
            4 * slice.n_atoms() as u64
        }
        fn sdram_usage(&self, _slice: Slice) -> u64 {
            0
        }
    }

    #[test]
    fn test_max_cpu() {
        let c = Constraint::max_cpu(1000, 0.9);
        assert_eq!(c.required_splits(&Linear, Slice::new(0, 100).unwrap()), 2);
        assert_eq!(c.required_splits(&Linear, Slice::new(0, 90).unwrap()), 1);
        assert_eq!(c.required_splits(&Linear, Slice::new(0, 91).unwrap()), 2);
    }

    #[test]
    fn test_max_dtcm_and_sdram() {
        let dtcm = Constraint::max_dtcm(100, 1.0);
        assert_eq!(dtcm.required_splits(&Linear, Slice::new(0, 100).unwrap()), 4);
        let sdram = Constraint::max_sdram(1, 0.5);
        assert_eq!(sdram.required_splits(&Linear, Slice::new(0, 100).unwrap()), 1);
    }

    #[test]
    fn test_zero_budget_never_fits() {
        let c = Constraint::max_cpu(0, 0.9);
        assert_eq!(c.required_splits(&Linear, Slice::single(0).unwrap()), usize::MAX);
    }

    #[test]
    fn test_max_atoms() {
        let c = Constraint::max_atoms(30);
        assert_eq!(c.required_splits(&Linear, Slice::new(0, 100).unwrap()), 4);
        assert_eq!(c.name(), "max_atoms(30)");
    }
}
