// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Every region renders exactly as many words as it reports for a slice

use ndarray::Array2;
use proptest::prelude::*;
use spinn_keyspace::{FieldSpec, Keyspace};
use spinn_memory::{
    BitfieldRecordingRegion, KeysRegion, ListRegion, MatrixPartitioning, MatrixPrepend, MatrixRegion, Region,
    WordFormatter,
};
use spinn_structures::Slice;

const ALL_PREPENDS: [MatrixPrepend; 5] = [
    MatrixPrepend::NAtoms,
    MatrixPrepend::NRows,
    MatrixPrepend::NColumns,
    MatrixPrepend::Size,
    MatrixPrepend::Index,
];

fn slice_strategy() -> impl Strategy<Value = Slice> {
    (0usize..12, 1usize..12).prop_map(|(start, n)| Slice::new(start, start + n).unwrap())
}

fn partitioning_strategy() -> impl Strategy<Value = MatrixPartitioning> {
    prop_oneof![
        Just(MatrixPartitioning::None),
        Just(MatrixPartitioning::Rows),
        Just(MatrixPartitioning::Columns),
    ]
}

/// Keys `0..n` in an 8-bit field, with an 8-bit sub-vertex field above
fn keyspaces(n: u64) -> Vec<Keyspace> {
    let ks = Keyspace::new(32).unwrap();
    ks.add_field(FieldSpec::new("k").length(8).start_at(0)).unwrap();
    ks.add_field(FieldSpec::new("s").length(8).start_at(8)).unwrap();
    (0..n).map(|k| ks.bind([("k", k)]).unwrap()).collect()
}

fn assert_agrees(region: &dyn Region, slice: Slice, index: usize) -> Result<(), TestCaseError> {
    let expected = region.sizeof(slice);
    let subregion = region.create_subregion(slice, index).unwrap();
    prop_assert_eq!(subregion.size_words(), expected);
    prop_assert_eq!(subregion.unfilled(), region.unfilled());
    if subregion.unfilled() {
        prop_assert!(subregion.data().is_empty());
    } else {
        prop_assert_eq!(subregion.data().len(), 4 * expected);
    }
    Ok(())
}

proptest! {
    #[test]
    fn list_region_size_matches_data(
        n_values in 0usize..16,
        prepend_n_atoms in any::<bool>(),
        prepend_length in any::<bool>(),
        slice in slice_strategy(),
        index in 0usize..8,
    ) {
        let values: Vec<f64> = (0..n_values).map(|i| i as f64 * 0.25 - 1.0).collect();
        let mut region = ListRegion::new(values, WordFormatter::default());
        if prepend_n_atoms {
            region = region.with_prepend_n_atoms();
        }
        if prepend_length {
            region = region.with_prepend_length();
        }
        assert_agrees(&region, slice, index)?;
    }

    #[test]
    fn matrix_region_size_matches_data(
        rows in 0usize..10,
        cols in 0usize..10,
        partitioning in partitioning_strategy(),
        prepend_flags in proptest::collection::vec(any::<bool>(), 5),
        reserved in any::<bool>(),
        slice in slice_strategy(),
        index in 0usize..8,
    ) {
        let prepends: Vec<MatrixPrepend> = ALL_PREPENDS
            .iter()
            .zip(&prepend_flags)
            .filter(|(_, keep)| **keep)
            .map(|(prepend, _)| *prepend)
            .collect();
        let region = if reserved {
            MatrixRegion::reserved((rows, cols), partitioning)
        } else {
            let matrix = Array2::from_shape_fn((rows, cols), |(r, c)| r as f64 - c as f64 * 0.5);
            MatrixRegion::new(matrix, partitioning, WordFormatter::default())
        }
        .with_prepends(&prepends);
        assert_agrees(&region, slice, index)?;
    }

    #[test]
    fn keys_region_size_matches_data(
        n_keys in 0u64..16,
        partitioned in any::<bool>(),
        with_mask in any::<bool>(),
        prepend_n_keys in any::<bool>(),
        slice in slice_strategy(),
        index in 0usize..8,
    ) {
        let mut region = KeysRegion::new(keyspaces(n_keys)).with_fill_in_field("s");
        if partitioned {
            region = region.partitioned();
        }
        if with_mask {
            region = region.with_mask();
        }
        if prepend_n_keys {
            region = region.with_prepend_n_keys();
        }
        assert_agrees(&region, slice, index)?;
    }

    #[test]
    fn recording_region_size_matches_reservation(
        n_ticks in 0usize..2000,
        slice in slice_strategy(),
        index in 0usize..8,
    ) {
        assert_agrees(&BitfieldRecordingRegion::new(n_ticks), slice, index)?;
    }
}
