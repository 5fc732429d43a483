/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for potential-field kernel generation.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Potential-field kernels and equivalent-layer inversion.
//!
//! Gravitational and magnetic data processing with equivalent layers rests
//! on dense sensitivity matrices built from the inverse distance `1/R`
//! between observation points and point sources. Materializing those
//! matrices costs **O(D·P)** memory and makes the linear inversions that
//! follow expensive at survey scale.
//!
//! This crate provides the building blocks for both the naive and the
//! structured path:
//!
//! - **Distance and gradient kernels** - the Squared Euclidean Distance
//!   Matrix ([`sedm`]) and its first and second derivative families
//!   ([`grad`], [`grad_tensor`]) for arbitrary point sets.
//! - **Compact grid kernels** - when observations and sources share one
//!   regular horizontal grid separated by a vertical offset, every kernel
//!   matrix is Block-Toeplitz-Toeplitz-Block. [`sedm_bttb`], [`grad_bttb`]
//!   and [`grad_tensor_bttb`] evaluate only the O(Nx + Ny) distinct lags
//!   and return [`BttbMetadata`] from the [`ferreus_bttb`] crate, which
//!   reconstructs the dense operator on demand.
//! - **Joint inversion** - the [`cgls`] solver estimates one source
//!   distribution from several stacked (sensitivity matrix, data vector)
//!   pairs without forming normal equations.
//!
//! Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra,
//! avoiding complex build dependencies.
//!
//! # Example
//!
//! ```
//! use ferreus_gravmag::{
//!     cgls, grad, sedm, sedm_bttb,
//!     FieldComponent, GridOrdering, RegularGrid,
//! };
//!
//! // A 4 x 3 observation grid at z = 0, with the source layer 10 below
//! let grid = RegularGrid::new([0.0, 30.0, 0.0, 20.0], (4, 3), 0.0).unwrap();
//! let delta_z = 10.0;
//!
//! // Compact representation of the squared distances to the source layer
//! let metadata = sedm_bttb(&grid, delta_z, GridOrdering::Xy).unwrap();
//!
//! // Expanding it reproduces the dense matrix built from the full grids
//! let data_points = grid.expand(GridOrdering::Xy);
//! let source_points = data_points.translate_z(delta_z);
//! let dense = sedm(&data_points, &source_points).unwrap();
//! let reconstructed = metadata.to_dense();
//! assert!((dense[(5, 2)] - reconstructed[(5, 2)]).abs() < 1e-10);
//!
//! // Build the vertical-field sensitivity and invert synthetic data
//! let sensitivity = grad(&data_points, &source_points, &dense, &[FieldComponent::Z])
//!     .unwrap()
//!     .remove(0);
//! let truth = faer::Mat::from_fn(sensitivity.ncols(), 1, |i, _| 1.0 + (i % 3) as f64);
//! let observed = &sensitivity * &truth;
//!
//! let solution = cgls(&[sensitivity], &[observed], 1e-6, 500, true, None).unwrap();
//! assert!(solution.converged);
//! ```
//!
//! # References
//! 1. Dampney, C. N. G. (1969). *The equivalent source technique.*
//!    Geophysics, 34(1), 39-53.
//! 2. Siqueira, F. C. L., Oliveira Jr., V. C., & Barbosa, V. C. F. (2017).
//!    *Fast iterative equivalent-layer technique for gravity data
//!    processing: A method grounded on excess mass constraint.* Geophysics,
//!    82(4), G57-G69.
//! 3. Takahashi, D., Oliveira Jr., V. C., & Barbosa, V. C. F. (2020).
//!    *Convolutional equivalent layer for gravity data processing.*
//!    Geophysics, 85(6), G129-G141.
//! 4. Aster, R. C., Borchers, B., & Thurber, C. H. (2018). *Parameter
//!    Estimation and Inverse Problems.* 3rd ed., Elsevier.

pub mod inverse_distance;

mod common;

mod error;

mod iterative_solvers;

pub mod progress;

pub use {
    common::generate_scattered_points,
    error::{GravmagError, GravmagResult},
    ferreus_bttb::{BttbError, BttbMetadata},
    ferreus_gravmag_utils::{GridOrdering, PointSet, RegularGrid, ValidationError},
    inverse_distance::{
        FieldComponent, TensorComponent, grad, grad_bttb, grad_tensor, grad_tensor_bttb, sedm,
        sedm_bttb,
    },
    iterative_solvers::{CglsSolution, cgls},
};
