// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_structures::Slice;

use crate::error::MemoryResult;
use crate::region::{Region, Subregion};

/// Space for one bit per atom per tick, filled by the running application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfieldRecordingRegion {
    pub n_ticks: usize,
}

impl BitfieldRecordingRegion {
    pub fn new(n_ticks: usize) -> Self {
        BitfieldRecordingRegion { n_ticks }
    }
}

impl Region for BitfieldRecordingRegion {
    fn sizeof(&self, slice: Slice) -> usize {
        slice.n_atoms().div_ceil(32) * self.n_ticks
    }

    fn create_subregion(&self, slice: Slice, _subvertex_index: usize) -> MemoryResult<Subregion> {
        Ok(Subregion::reserved(self.sizeof(slice)))
    }

    fn in_dtcm(&self) -> bool {
        false
    }

    fn unfilled(&self) -> bool {
        true
    }
}
