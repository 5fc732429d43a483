/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the Block-Toeplitz-Toeplitz-Block (BTTB) matrix crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Block-Toeplitz-Toeplitz-Block (BTTB) matrices
//!
//! A BTTB matrix is partitioned into Nb×Nb blocks of size Bl×Bl such that the
//! block pattern is Toeplitz along one axis and each block is itself Toeplitz
//! along the other. Such matrices arise whenever a translation-invariant
//! kernel is sampled on a regular rectangular grid: the kernel value between
//! two grid points depends only on their index lags, so the full N×N matrix
//! (N = Nb·Bl) is determined by O(Nb·Bl) distinct values.
//!
//! This crate stores that determining set as [`BttbMetadata`]: one symmetry
//! flag per axis, the block shape, and the grid of stored lag values. An axis
//! whose kernel is an even function of its lag stores only the non-negative
//! lags; otherwise the full signed-lag range is stored. The dense operator is
//! recovered with [`BttbMetadata::to_dense`].
//!
//! # Example
//!
//! ```
//! use ferreus_bttb::BttbMetadata;
//! use faer::mat;
//!
//! // Two 2x2 Toeplitz blocks in a Toeplitz block layout, both axes even:
//! // stored values are the first column of the full matrix, reshaped by lag.
//! let values = mat![
//!     [1.0, 2.0],
//!     [5.0, 6.0f64],
//! ];
//! let metadata = BttbMetadata::new(true, true, 2, 2, values).unwrap();
//! let dense = metadata.to_dense();
//!
//! assert_eq!(dense.nrows(), 4);
//! // Entry (row 3, col 0) has block lag 1 and entry lag 1.
//! assert_eq!(dense[(3, 0)], 6.0);
//! // Mirrored lags reuse the same stored value.
//! assert_eq!(dense[(0, 3)], 6.0);
//! ```
//!
//! # References
//! 1. Chan, R. H., & Jin, X. (2007). *An Introduction to Iterative Toeplitz
//!    Solvers.* SIAM.
//! 2. Takahashi, D., Oliveira Jr., V. C., & Barbosa, V. C. F. (2020).
//!    *Convolutional equivalent layer for gravity data processing.*
//!    Geophysics, 85(6), G129-G141.

mod bttb;

#[doc(inline)]
pub use bttb::{BttbError, BttbMetadata};
