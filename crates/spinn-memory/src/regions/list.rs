// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_structures::Slice;

use crate::error::MemoryResult;
use crate::formatter::WordFormatter;
use crate::region::{Region, Subregion};

/// A fixed list of values, identical for every slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRegion {
    values: Vec<f64>,
    formatter: WordFormatter,
    prepend_n_atoms: bool,
    prepend_length: bool,
    in_dtcm: bool,
}

impl ListRegion {
    pub fn new(values: Vec<f64>, formatter: WordFormatter) -> Self {
        ListRegion {
            values,
            formatter,
            prepend_n_atoms: false,
            prepend_length: false,
            in_dtcm: true,
        }
    }

    /// Words written unchanged
    pub fn from_words(words: &[u32]) -> Self {
        Self::new(words.iter().map(|w| f64::from(*w)).collect(), WordFormatter::Unsigned)
    }

    /// Start with the number of atoms in the slice
    pub fn with_prepend_n_atoms(mut self) -> Self {
        self.prepend_n_atoms = true;
        self
    }

    /// Start with the number of values (after the atom count, if any)
    pub fn with_prepend_length(mut self) -> Self {
        self.prepend_length = true;
        self
    }

    pub fn in_sdram(mut self) -> Self {
        self.in_dtcm = false;
        self
    }

    fn n_prepends(&self) -> usize {
        usize::from(self.prepend_n_atoms) + usize::from(self.prepend_length)
    }
}

impl Region for ListRegion {
    fn sizeof(&self, _slice: Slice) -> usize {
        self.n_prepends() + self.values.len()
    }

    fn create_subregion(&self, slice: Slice, _subvertex_index: usize) -> MemoryResult<Subregion> {
        let mut words = Vec::with_capacity(self.sizeof(slice));
        if self.prepend_n_atoms {
            words.push(slice.n_atoms() as u32);
        }
        if self.prepend_length {
            words.push(self.values.len() as u32);
        }
        words.extend(self.values.iter().map(|v| self.formatter.format(*v)));
        Ok(Subregion::from_words(&words))
    }

    fn in_dtcm(&self) -> bool {
        self.in_dtcm
    }
}
