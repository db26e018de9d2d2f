// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use ndarray::{s, Array2, ArrayView2};
use spinn_structures::Slice;

use crate::error::{MemoryError, MemoryResult};
use crate::formatter::WordFormatter;
use crate::region::{Region, Subregion};

/// Axis of the matrix that follows the atoms of the slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixPartitioning {
    None,
    Rows,
    Columns,
}

/// One-word headers written before the matrix, in the order given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixPrepend {
    NAtoms,
    NRows,
    NColumns,
    /// Number of matrix elements written
    Size,
    /// Index of the split vertex
    Index,
}

/// A matrix written row-major, optionally cut down to the slice's rows or
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRegion {
    matrix: Option<Array2<f64>>,
    shape: (usize, usize),
    partitioning: MatrixPartitioning,
    prepends: Vec<MatrixPrepend>,
    formatter: WordFormatter,
    in_dtcm: bool,
}

impl MatrixRegion {
    pub fn new(matrix: Array2<f64>, partitioning: MatrixPartitioning, formatter: WordFormatter) -> Self {
        MatrixRegion {
            shape: matrix.dim(),
            matrix: Some(matrix),
            partitioning,
            prepends: Vec::new(),
            formatter,
            in_dtcm: true,
        }
    }

    /// Space for a matrix of `shape` that the application fills itself
    pub fn reserved(shape: (usize, usize), partitioning: MatrixPartitioning) -> Self {
        MatrixRegion {
            matrix: None,
            shape,
            partitioning,
            prepends: Vec::new(),
            formatter: WordFormatter::default(),
            in_dtcm: true,
        }
    }

    pub fn with_prepends(mut self, prepends: &[MatrixPrepend]) -> Self {
        self.prepends.extend_from_slice(prepends);
        self
    }

    pub fn with_prepend_n_atoms(self) -> Self {
        self.with_prepends(&[MatrixPrepend::NAtoms])
    }

    pub fn with_prepend_full_length(self) -> Self {
        self.with_prepends(&[MatrixPrepend::Size])
    }

    pub fn in_sdram(mut self) -> Self {
        self.in_dtcm = false;
        self
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Range of the partitioned axis covered by `slice`, clipped to the
    /// axis length
    fn clip(slice: Slice, axis_len: usize) -> (usize, usize) {
        let stop = slice.stop().min(axis_len);
        (slice.start().min(stop), stop)
    }

    fn sliced_shape(&self, slice: Slice) -> (usize, usize) {
        let (rows, cols) = self.shape;
        match self.partitioning {
            MatrixPartitioning::None => (rows, cols),
            MatrixPartitioning::Rows => {
                let (start, stop) = Self::clip(slice, rows);
                (stop - start, cols)
            }
            MatrixPartitioning::Columns => {
                let (start, stop) = Self::clip(slice, cols);
                (rows, stop - start)
            }
        }
    }

    fn view<'a>(&self, matrix: &'a Array2<f64>, slice: Slice) -> ArrayView2<'a, f64> {
        match self.partitioning {
            MatrixPartitioning::None => matrix.view(),
            MatrixPartitioning::Rows => {
                let (start, stop) = Self::clip(slice, matrix.nrows());
                matrix.slice(s![start..stop, ..])
            }
            MatrixPartitioning::Columns => {
                let (start, stop) = Self::clip(slice, matrix.ncols());
                matrix.slice(s![.., start..stop])
            }
        }
    }
}

impl Region for MatrixRegion {
    fn sizeof(&self, slice: Slice) -> usize {
        let (rows, cols) = self.sliced_shape(slice);
        rows * cols + self.prepends.len()
    }

    fn create_subregion(&self, slice: Slice, subvertex_index: usize) -> MemoryResult<Subregion> {
        let Some(matrix) = &self.matrix else {
            return Ok(Subregion::reserved(self.sizeof(slice)));
        };
        if matrix.dim() != self.shape {
            return Err(MemoryError::InvalidRegion(format!(
                "matrix shape {:?} does not match declared shape {:?}",
                matrix.dim(),
                self.shape
            )));
        }

        let data = self.view(matrix, slice);
        let mut words: Vec<u32> = self
            .prepends
            .iter()
            .map(|prepend| match prepend {
                MatrixPrepend::NAtoms => slice.n_atoms() as u32,
                MatrixPrepend::NRows => data.nrows() as u32,
                MatrixPrepend::NColumns => data.ncols() as u32,
                MatrixPrepend::Size => data.len() as u32,
                MatrixPrepend::Index => subvertex_index as u32,
            })
            .collect();
        words.extend(data.iter().map(|v| self.formatter.format(*v)));
        Ok(Subregion::from_words(&words))
    }

    fn in_dtcm(&self) -> bool {
        self.in_dtcm
    }

    fn unfilled(&self) -> bool {
        self.matrix.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    /// 50 x 5 matrix counting up row-major
    fn counting() -> Array2<f64> {
        Array::from_shape_fn((50, 5), |(r, c)| (r * 5 + c) as f64)
    }

    #[test]
    fn test_unpartitioned_sizeof_ignores_slice() {
        let region = MatrixRegion::new(Array2::zeros((10, 10)), MatrixPartitioning::None, WordFormatter::Unsigned);
        assert_eq!(region.sizeof(Slice::new(0, 5).unwrap()), 100);
        assert_eq!(region.sizeof(Slice::new(0, 101).unwrap()), 100);
    }

    #[test]
    fn test_partitioned_sizeof() {
        let rows = MatrixRegion::new(counting(), MatrixPartitioning::Rows, WordFormatter::Unsigned);
        assert_eq!(rows.sizeof(Slice::new(0, 10).unwrap()), 10 * 5);
        assert_eq!(rows.sizeof(Slice::new(45, 60).unwrap()), 5 * 5);

        let cols = MatrixRegion::new(counting(), MatrixPartitioning::Columns, WordFormatter::Unsigned);
        assert_eq!(cols.sizeof(Slice::new(1, 3).unwrap()), 50 * 2);
        assert_eq!(cols.sizeof(Slice::new(10, 12).unwrap()), 0);
    }

    #[test]
    fn test_rows_subregion_with_prepends() {
        let region = MatrixRegion::new(counting(), MatrixPartitioning::Rows, WordFormatter::Unsigned)
            .with_prepend_n_atoms()
            .with_prepend_full_length();
        let slice = Slice::new(10, 20).unwrap();
        let sr = region.create_subregion(slice, 0).unwrap();
        let words = sr.words();
        assert_eq!(words[0], 10);
        assert_eq!(words[1], 50);
        assert_eq!(words[2], 50);
        assert_eq!(words[words.len() - 1], 99);
        assert_eq!(sr.size_words(), region.sizeof(slice));
    }

    #[test]
    fn test_columns_subregion() {
        let region = MatrixRegion::new(counting(), MatrixPartitioning::Columns, WordFormatter::Unsigned)
            .with_prepends(&[MatrixPrepend::NRows, MatrixPrepend::NColumns, MatrixPrepend::Index]);
        let slice = Slice::new(3, 5).unwrap();
        let words = region.create_subregion(slice, 4).unwrap().words();
        assert_eq!(&words[..5], &[50, 2, 4, 3, 4]);
        assert_eq!(&words[5..7], &[8, 9]);
        assert_eq!(words.len(), region.sizeof(slice));
    }

    #[test]
    fn test_formatter_applied() {
        let region = MatrixRegion::new(
            Array2::from_elem((1, 2), 0.5),
            MatrixPartitioning::None,
            WordFormatter::default(),
        );
        assert_eq!(region.create_subregion(Slice::single(0).unwrap(), 0).unwrap().words(), vec![0x4000, 0x4000]);
    }

    #[test]
    fn test_reserved_matrix() {
        let region = MatrixRegion::reserved((100, 5), MatrixPartitioning::Rows).with_prepend_n_atoms();
        assert!(region.unfilled());
        let slice = Slice::new(0, 10).unwrap();
        let sr = region.create_subregion(slice, 0).unwrap();
        assert!(sr.unfilled());
        assert_eq!(sr.size_words(), 51);
    }
}
