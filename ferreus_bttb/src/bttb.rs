/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the BTTB metadata value type and its dense matrix reconstruction.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, MatRef};
use rayon::prelude::*;
use std::error::Error;
use std::fmt;

/// Errors raised when constructing [`BttbMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BttbError {
    /// The block count or block size is zero.
    InvalidShape {
        num_blocks: usize,
        block_size: usize,
    },

    /// The stored value grid does not have the dimensions implied by the
    /// symmetry flags and the block shape.
    ValueShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for BttbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BttbError::InvalidShape {
                num_blocks,
                block_size,
            } => write!(
                f,
                "BTTB shape must be non-degenerate (got {} blocks of size {})",
                num_blocks, block_size
            ),
            BttbError::ValueShapeMismatch { expected, found } => write!(
                f,
                "stored values have shape ({}, {}) but the symmetry flags and block shape \
                 require ({}, {})",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl Error for BttbError {}

/// Compact representation of a Block-Toeplitz-Toeplitz-Block matrix.
///
/// The represented matrix has `num_blocks`² blocks of size `block_size`²;
/// entry `(p·Bl + a, q·Bl + b)` depends only on the block lag `p − q` and the
/// entry lag `a − b`. The `values` grid stores one number per distinct lag
/// pair: rows follow the block-axis lag, columns follow the entry-axis lag.
///
/// A symmetric axis (kernel even in its lag) stores the `N` non-negative
/// lags, index `k` holding lag `k`. An asymmetric axis stores all `2N − 1`
/// signed lags in ascending order, index `k` holding lag `k − (N − 1)`;
/// positive lag means the row-side grid index is the later one.
#[derive(Debug, Clone, PartialEq)]
pub struct BttbMetadata {
    symmetric_blocks: bool,
    symmetric_entries: bool,
    num_blocks: usize,
    block_size: usize,
    values: Mat<f64>,
}

impl BttbMetadata {
    /// Creates metadata after checking the stored value grid against the
    /// symmetry flags and block shape.
    ///
    /// # Arguments
    /// * `symmetric_blocks` - Whether the kernel is even in the block-axis lag.
    /// * `symmetric_entries` - Whether the kernel is even in the entry-axis lag.
    /// * `num_blocks` - Number of blocks along each side of the matrix.
    /// * `block_size` - Side length of each Toeplitz block.
    /// * `values` - Stored lag values, `(block lags) × (entry lags)`.
    pub fn new(
        symmetric_blocks: bool,
        symmetric_entries: bool,
        num_blocks: usize,
        block_size: usize,
        values: Mat<f64>,
    ) -> Result<Self, BttbError> {
        if num_blocks == 0 || block_size == 0 {
            return Err(BttbError::InvalidShape {
                num_blocks,
                block_size,
            });
        }

        let expected = (
            stored_lag_count(symmetric_blocks, num_blocks),
            stored_lag_count(symmetric_entries, block_size),
        );
        let found = values.shape();
        if found != expected {
            return Err(BttbError::ValueShapeMismatch { expected, found });
        }

        Ok(Self {
            symmetric_blocks,
            symmetric_entries,
            num_blocks,
            block_size,
            values,
        })
    }

    /// Returns whether the block axis is stored symmetrically.
    pub fn symmetric_blocks(&self) -> bool {
        self.symmetric_blocks
    }

    /// Returns whether the entry axis is stored symmetrically.
    pub fn symmetric_entries(&self) -> bool {
        self.symmetric_entries
    }

    /// Returns the number of blocks along each side.
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Returns the side length of each block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the side length of the represented dense matrix.
    pub fn nrows(&self) -> usize {
        self.num_blocks * self.block_size
    }

    /// Returns the stored lag-value grid.
    pub fn values(&self) -> MatRef<'_, f64> {
        self.values.as_ref()
    }

    /// Returns the stored value for the signed lag pair
    /// `(block lag, entry lag)`.
    #[inline(always)]
    fn value_at(&self, block_lag: isize, entry_lag: isize) -> f64 {
        let row = stored_index(self.symmetric_blocks, self.num_blocks, block_lag);
        let column = stored_index(self.symmetric_entries, self.block_size, entry_lag);
        self.values[(row, column)]
    }

    /// Reconstructs the dense matrix represented by this metadata.
    ///
    /// The result is a fresh owned matrix of side `num_blocks · block_size`
    /// with no aliasing back into the stored values. Rows are filled in
    /// parallel; each entry is a pure lag lookup, so the output is
    /// deterministic regardless of the work decomposition.
    pub fn to_dense(&self) -> Mat<f64> {
        let side = self.nrows();
        let block_size = self.block_size as isize;

        let mut buffer = vec![0.0; side * side];
        buffer
            .par_chunks_mut(side)
            .enumerate()
            .for_each(|(row, out)| {
                let p = row as isize / block_size;
                let a = row as isize % block_size;
                for (column, value) in out.iter_mut().enumerate() {
                    let q = column as isize / block_size;
                    let b = column as isize % block_size;
                    *value = self.value_at(p - q, a - b);
                }
            });

        MatRef::from_row_major_slice(buffer.as_slice(), side, side).to_owned()
    }
}

/// Number of stored lags along one axis of length `n`.
#[inline(always)]
fn stored_lag_count(symmetric: bool, n: usize) -> usize {
    match symmetric {
        true => n,
        false => 2 * n - 1,
    }
}

/// Storage index of a signed lag along one axis of length `n`.
#[inline(always)]
fn stored_index(symmetric: bool, n: usize, lag: isize) -> usize {
    match symmetric {
        true => lag.unsigned_abs(),
        false => (lag + n as isize - 1) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn symmetric_axes_expand_to_a_mirrored_toeplitz_grid() {
        // Nb = 2 blocks of size Bl = 3, both axes even.
        let values = mat![
            [10.0, 11.0, 12.0],
            [20.0, 21.0, 22.0f64],
        ];
        let metadata = BttbMetadata::new(true, true, 2, 3, values).unwrap();
        let dense = metadata.to_dense();

        let expected = mat![
            [10.0, 11.0, 12.0, 20.0, 21.0, 22.0],
            [11.0, 10.0, 11.0, 21.0, 20.0, 21.0],
            [12.0, 11.0, 10.0, 22.0, 21.0, 20.0],
            [20.0, 21.0, 22.0, 10.0, 11.0, 12.0],
            [21.0, 20.0, 21.0, 11.0, 10.0, 11.0],
            [22.0, 21.0, 20.0, 12.0, 11.0, 10.0f64],
        ];
        assert_eq!(dense, expected);
    }

    #[test]
    fn asymmetric_entry_axis_reads_signed_lags() {
        // One block of size 3, entry axis stored over lags -2..=2.
        let values = mat![[-2.0, -1.0, 0.0, 1.0, 2.0f64]];
        let metadata = BttbMetadata::new(true, false, 1, 3, values).unwrap();
        let dense = metadata.to_dense();

        let expected = mat![
            [0.0, -1.0, -2.0],
            [1.0, 0.0, -1.0],
            [2.0, 1.0, 0.0f64],
        ];
        assert_eq!(dense, expected);
    }

    #[test]
    fn asymmetric_block_axis_reads_signed_lags() {
        // Three blocks of size 1, block axis stored over lags -2..=2.
        let values = mat![[-2.0], [-1.0], [0.0], [1.0], [2.0f64]];
        let metadata = BttbMetadata::new(false, true, 3, 1, values).unwrap();
        let dense = metadata.to_dense();

        let expected = mat![
            [0.0, -1.0, -2.0],
            [1.0, 0.0, -1.0],
            [2.0, 1.0, 0.0f64],
        ];
        assert_eq!(dense, expected);
    }

    #[test]
    fn both_axes_asymmetric_cover_the_full_lag_grid() {
        // Nb = Bl = 2: stored grid is 3x3 over lag pairs (-1..=1, -1..=1).
        let values = mat![
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0, 9.0f64],
        ];
        let metadata = BttbMetadata::new(false, false, 2, 2, values).unwrap();
        let dense = metadata.to_dense();

        let expected = mat![
            [5.0, 4.0, 2.0, 1.0],
            [6.0, 5.0, 3.0, 2.0],
            [8.0, 7.0, 5.0, 4.0],
            [9.0, 8.0, 6.0, 5.0f64],
        ];
        assert_eq!(dense, expected);
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        assert!(matches!(
            BttbMetadata::new(true, true, 0, 3, Mat::zeros(0, 3)),
            Err(BttbError::InvalidShape {
                num_blocks: 0,
                block_size: 3
            })
        ));
        assert!(matches!(
            BttbMetadata::new(true, true, 2, 0, Mat::zeros(2, 0)),
            Err(BttbError::InvalidShape {
                num_blocks: 2,
                block_size: 0
            })
        ));
    }

    #[test]
    fn stored_values_must_match_flags_and_shape() {
        // Asymmetric entry axis requires 2*3 - 1 = 5 columns, not 3.
        let result = BttbMetadata::new(true, false, 2, 3, Mat::zeros(2, 3));
        assert!(matches!(
            result,
            Err(BttbError::ValueShapeMismatch {
                expected: (2, 5),
                found: (2, 3)
            })
        ));
    }

    #[test]
    fn single_cell_matrix_round_trips() {
        let metadata = BttbMetadata::new(true, true, 1, 1, mat![[7.5f64]]).unwrap();
        assert_eq!(metadata.to_dense(), mat![[7.5f64]]);
    }
}
