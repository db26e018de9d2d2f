// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexSet;
use spinn_structures::TransformMatrix;

use crate::reduced::OutgoingReducedConnection;

/// Distinct transforms applied by one transmitting object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformCollection {
    /// Rows transmitted over all distinct transforms
    pub width: usize,
    pub transforms: Vec<TransformMatrix>,
    /// Index into `transforms` for each connection passed in
    pub indices: Vec<usize>,
}

impl TransformCollection {
    pub fn from_outgoing<'a, I>(connections: I) -> Self
    where
        I: IntoIterator<Item = &'a OutgoingReducedConnection>,
    {
        let mut unique: IndexSet<TransformMatrix> = IndexSet::new();
        let indices = connections
            .into_iter()
            .map(|c| unique.insert_full(c.transform.clone()).0)
            .collect();
        let transforms: Vec<TransformMatrix> = unique.into_iter().collect();
        TransformCollection {
            width: transforms.iter().map(TransformMatrix::n_rows).sum(),
            transforms,
            indices,
        }
    }

    /// First transmitted row of each distinct transform
    pub fn row_offsets(&self) -> Vec<usize> {
        self.transforms
            .iter()
            .scan(0, |offset, t| {
                let start = *offset;
                *offset += t.n_rows();
                Some(start)
            })
            .collect()
    }
}
