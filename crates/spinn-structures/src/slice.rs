// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Contiguous atom ranges.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Range;

use crate::error::{SpinnDataError, SpinnDataResult};

/// A half-open range `[start, stop)` of atoms or dimensions.
///
/// Slices are non-empty: `start < stop` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSlice", into = "RawSlice")]
pub struct Slice {
    start: usize,
    stop: usize,
}

#[derive(Serialize, Deserialize)]
struct RawSlice {
    start: usize,
    stop: usize,
}

impl TryFrom<RawSlice> for Slice {
    type Error = SpinnDataError;

    fn try_from(raw: RawSlice) -> Result<Self, Self::Error> {
        Slice::new(raw.start, raw.stop)
    }
}

impl From<Slice> for RawSlice {
    fn from(slice: Slice) -> Self {
        RawSlice {
            start: slice.start,
            stop: slice.stop,
        }
    }
}

impl Slice {
    pub fn new(start: usize, stop: usize) -> SpinnDataResult<Self> {
        if start >= stop {
            return Err(SpinnDataError::BadParameters(format!(
                "Slice start ({}) must be below stop ({})",
                start, stop
            )));
        }
        Ok(Slice { start, stop })
    }

    /// The slice `[0, n_atoms)`
    pub fn full(n_atoms: usize) -> SpinnDataResult<Self> {
        Slice::new(0, n_atoms)
    }

    /// The one-atom slice `[index, index + 1)`
    pub fn single(index: usize) -> SpinnDataResult<Self> {
        let stop = index.checked_add(1).ok_or_else(|| {
            SpinnDataError::BadParameters(format!("Slice at index {} has no stop", index))
        })?;
        Slice::new(index, stop)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    pub fn n_atoms(&self) -> usize {
        self.stop - self.start
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.stop
    }

    pub fn contains(&self, index: usize) -> bool {
        self.as_range().contains(&index)
    }

    /// Split into exactly `k` contiguous slices covering this one.
    ///
    /// Sizes differ by at most one atom and never exceed `ceil(n_atoms / k)`;
    /// the larger slices come first.
    pub fn split_into(&self, k: usize) -> SpinnDataResult<Vec<Slice>> {
        let n = self.n_atoms();
        if k == 0 || k > n {
            return Err(SpinnDataError::BadParameters(format!(
                "Cannot split {} into {} slices",
                self, k
            )));
        }

        let base = n / k;
        let extra = n % k;
        let mut slices = Vec::with_capacity(k);
        let mut start = self.start;
        for i in 0..k {
            let size = base + usize::from(i < extra);
            slices.push(Slice {
                start,
                stop: start + size,
            });
            start += size;
        }
        Ok(slices)
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slice({}, {})", self.start, self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slice_rejected() {
        assert!(Slice::new(3, 3).is_err());
        assert!(Slice::new(5, 2).is_err());
        assert!(Slice::full(0).is_err());
    }

    #[test]
    fn test_single() {
        let s = Slice::single(7).unwrap();
        assert_eq!(s.n_atoms(), 1);
        assert!(s.contains(7));
        assert!(!s.contains(8));
        assert_eq!(s.to_string(), "Slice(7, 8)");
    }

    #[test]
    fn test_single_at_last_index() {
        assert!(matches!(Slice::single(usize::MAX), Err(SpinnDataError::BadParameters(_))));
        assert_eq!(Slice::single(usize::MAX - 1).unwrap().stop(), usize::MAX);
    }

    #[test]
    fn test_split_even() {
        let slices = Slice::full(100).unwrap().split_into(2).unwrap();
        assert_eq!(slices, vec![Slice::new(0, 50).unwrap(), Slice::new(50, 100).unwrap()]);
    }

    #[test]
    fn test_split_uneven_keeps_count() {
        // ceil(10 / 6) = 2, yet six slices are still produced
        let slices = Slice::new(5, 15).unwrap().split_into(6).unwrap();
        assert_eq!(slices.len(), 6);
        assert_eq!(slices[0].start(), 5);
        assert_eq!(slices[5].stop(), 15);
        assert!(slices.iter().all(|s| s.n_atoms() <= 2));
    }

    #[test]
    fn test_split_too_many() {
        let s = Slice::full(3).unwrap();
        assert!(s.split_into(4).is_err());
        assert!(s.split_into(0).is_err());
    }

    #[test]
    fn test_serde_rejects_empty() {
        assert!(serde_json::from_str::<Slice>(r#"{"start":2,"stop":2}"#).is_err());
        let s: Slice = serde_json::from_str(r#"{"start":2,"stop":4}"#).unwrap();
        assert_eq!(s.n_atoms(), 2);
    }
}
