// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The region abstraction shared by every memory block type.

use byteorder::{ByteOrder, LittleEndian};
use spinn_structures::Slice;

use crate::error::MemoryResult;

/// A typed block of a vertex's memory image.
///
/// For any slice, `create_subregion(slice, _).size_words` equals
/// `sizeof(slice)`, and a filled subregion carries exactly that many words.
pub trait Region: Send + Sync {
    /// Size in 32-bit words for the atoms in `slice`
    fn sizeof(&self, slice: Slice) -> usize;

    /// Render the block for the atoms in `slice`, placed as the
    /// `subvertex_index`-th split of its vertex
    fn create_subregion(&self, slice: Slice, subvertex_index: usize) -> MemoryResult<Subregion>;

    /// Whether the block is copied into core-local memory
    fn in_dtcm(&self) -> bool {
        true
    }

    /// Whether the block only reserves space and is never written
    fn unfilled(&self) -> bool {
        false
    }
}

/// A rendered region, ready to be placed in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subregion {
    data: Vec<u8>,
    size_words: usize,
    unfilled: bool,
}

impl Subregion {
    /// A written block holding `words` in little-endian order
    pub fn from_words(words: &[u32]) -> Self {
        let mut data = vec![0u8; words.len() * 4];
        LittleEndian::write_u32_into(words, &mut data);
        Subregion {
            data,
            size_words: words.len(),
            unfilled: false,
        }
    }

    /// Reserved space that is never written
    pub fn reserved(size_words: usize) -> Self {
        Subregion {
            data: Vec::new(),
            size_words,
            unfilled: true,
        }
    }

    /// Little-endian bytes; empty when unfilled
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn words(&self) -> Vec<u32> {
        let mut words = vec![0u32; self.data.len() / 4];
        LittleEndian::read_u32_into(&self.data, &mut words);
        words
    }

    pub fn size_words(&self) -> usize {
        self.size_words
    }

    pub fn size_bytes(&self) -> usize {
        self.size_words * 4
    }

    pub fn unfilled(&self) -> bool {
        self.unfilled
    }
}
