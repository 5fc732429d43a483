/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the inverse-distance kernel generators: SEDM, gradients, and BTTB grid variants.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # inverse_distance
//!
//! Kernels of the inverse-distance function `1/R` between observation points
//! and point sources, which underpin gravitational and magnetic
//! equivalent-layer modelling:
//!
//! - [`sedm`] builds the Squared Euclidean Distance Matrix between two point
//!   sets.
//! - [`grad`] and [`grad_tensor`] build the first and second spatial
//!   derivative kernels `-Δc/R³` and `3·Δc·Δc'/R⁵ - δ/R³` from a precomputed
//!   SEDM.
//! - [`sedm_bttb`], [`grad_bttb`] and [`grad_tensor_bttb`] are the
//!   regular-grid counterparts: when observations and sources share one
//!   horizontal grid separated by a vertical offset, every kernel matrix is
//!   Block-Toeplitz-Toeplitz-Block, so only the distinct axis lags are
//!   evaluated and the result is returned as [`BttbMetadata`].
//!
//! Coincident observation and source points are not screened: they produce
//! IEEE infinities or NaNs through the `1/R³` and `1/R⁵` factors rather than
//! an error.
//!
//! # References
//! 1. Dampney, C. N. G. (1969). *The equivalent source technique.*
//!    Geophysics, 34(1), 39-53.
//! 2. Takahashi, D., Oliveira Jr., V. C., & Barbosa, V. C. F. (2020).
//!    *Convolutional equivalent layer for gravity data processing.*
//!    Geophysics, 85(6), G129-G141.

use crate::error::GravmagResult;
use faer::{Mat, MatRef};
use ferreus_bttb::{BttbError, BttbMetadata};
use ferreus_gravmag_utils::validation::{self, ValidationError};
use ferreus_gravmag_utils::{GridOrdering, PointSet, RegularGrid};
use itertools::iproduct;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// First-derivative kernel components along the coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldComponent {
    X,
    Y,
    Z,
}

impl FieldComponent {
    /// All components in canonical order; the default request set.
    pub const ALL: [FieldComponent; 3] =
        [FieldComponent::X, FieldComponent::Y, FieldComponent::Z];

    /// Returns the lowercase label of this component.
    pub fn label(self) -> &'static str {
        match self {
            FieldComponent::X => "x",
            FieldComponent::Y => "y",
            FieldComponent::Z => "z",
        }
    }

    /// Parses a list of component labels, rejecting unknown entries.
    pub fn from_labels(labels: &[&str]) -> Result<Vec<Self>, ValidationError> {
        labels.iter().map(|label| label.parse()).collect()
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for FieldComponent {
    type Err = ValidationError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "x" => Ok(FieldComponent::X),
            "y" => Ok(FieldComponent::Y),
            "z" => Ok(FieldComponent::Z),
            _ => Err(ValidationError::InvalidComponent {
                label: label.to_string(),
            }),
        }
    }
}

/// Second-derivative kernel components (the gradient tensor).
///
/// Only the upper triangle is distinct; the remaining entries follow from
/// symmetry of second derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorComponent {
    Xx,
    Xy,
    Xz,
    Yy,
    Yz,
    Zz,
}

impl TensorComponent {
    /// All components in canonical order; the default request set.
    pub const ALL: [TensorComponent; 6] = [
        TensorComponent::Xx,
        TensorComponent::Xy,
        TensorComponent::Xz,
        TensorComponent::Yy,
        TensorComponent::Yz,
        TensorComponent::Zz,
    ];

    /// Returns the lowercase label of this component.
    pub fn label(self) -> &'static str {
        match self {
            TensorComponent::Xx => "xx",
            TensorComponent::Xy => "xy",
            TensorComponent::Xz => "xz",
            TensorComponent::Yy => "yy",
            TensorComponent::Yz => "yz",
            TensorComponent::Zz => "zz",
        }
    }

    /// Parses a list of component labels, rejecting unknown entries.
    pub fn from_labels(labels: &[&str]) -> Result<Vec<Self>, ValidationError> {
        labels.iter().map(|label| label.parse()).collect()
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for TensorComponent {
    type Err = ValidationError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "xx" => Ok(TensorComponent::Xx),
            "xy" => Ok(TensorComponent::Xy),
            "xz" => Ok(TensorComponent::Xz),
            "yy" => Ok(TensorComponent::Yy),
            "yz" => Ok(TensorComponent::Yz),
            "zz" => Ok(TensorComponent::Zz),
            _ => Err(ValidationError::InvalidComponent {
                label: label.to_string(),
            }),
        }
    }
}

/// Computes the Squared Euclidean Distance Matrix (SEDM) between two point
/// sets.
///
/// # Arguments
/// * `data_points` - D observation points.
/// * `source_points` - P source points.
///
/// # Returns
/// A D×P matrix whose entry (i, j) is the squared distance between
/// observation i and source j. Rows are filled in parallel.
pub fn sedm(data_points: &PointSet, source_points: &PointSet) -> GravmagResult<Mat<f64>> {
    let num_data = validation::check_point_set(data_points)?;
    let num_sources = validation::check_point_set(source_points)?;

    let mut buffer = vec![0.0; num_data * num_sources];
    buffer
        .par_chunks_mut(num_sources)
        .enumerate()
        .for_each(|(i, row)| {
            let (xi, yi, zi) = (data_points.x[i], data_points.y[i], data_points.z[i]);
            for (j, value) in row.iter_mut().enumerate() {
                let dx = xi - source_points.x[j];
                let dy = yi - source_points.y[j];
                let dz = zi - source_points.z[j];
                *value = dx * dx + dy * dy + dz * dz;
            }
        });

    Ok(MatRef::from_row_major_slice(buffer.as_slice(), num_data, num_sources).to_owned())
}

/// Computes first-derivative kernel matrices of the inverse distance.
///
/// For each requested component c, entry (i, j) of the returned matrix is
/// `-Δc / R³` with `Δc` the signed coordinate difference (observation minus
/// source) and `R` the Euclidean distance taken from the supplied SEDM.
///
/// Components may repeat; each distinct component is computed once and
/// repeated requests receive identical copies.
///
/// # Arguments
/// * `data_points` - D observation points.
/// * `source_points` - P source points.
/// * `sedm` - D×P squared-distance matrix for the same two point sets.
/// * `components` - Requested components; pass [`FieldComponent::ALL`] for
///   all three.
///
/// # Returns
/// One D×P matrix per requested component, in request order.
pub fn grad(
    data_points: &PointSet,
    source_points: &PointSet,
    sedm: &Mat<f64>,
    components: &[FieldComponent],
) -> GravmagResult<Vec<Mat<f64>>> {
    let num_data = validation::check_point_set(data_points)?;
    let num_sources = validation::check_point_set(source_points)?;
    validation::check_matrix_shape("SEDM", sedm.shape(), (num_data, num_sources))?;

    let inv_r3 = Mat::from_fn(num_data, num_sources, |i, j| {
        let r2 = sedm[(i, j)];
        1.0 / (r2 * r2.sqrt())
    });

    let mut cached: [Option<Mat<f64>>; 3] = [None, None, None];
    let mut matrices = Vec::with_capacity(components.len());
    for &component in components {
        let matrix = cached[component.index()].get_or_insert_with(|| {
            Mat::from_fn(num_data, num_sources, |i, j| {
                let delta = match component {
                    FieldComponent::X => data_points.x[i] - source_points.x[j],
                    FieldComponent::Y => data_points.y[i] - source_points.y[j],
                    FieldComponent::Z => data_points.z[i] - source_points.z[j],
                };
                -delta * inv_r3[(i, j)]
            })
        });
        matrices.push(matrix.clone());
    }

    Ok(matrices)
}

/// Computes second-derivative kernel matrices of the inverse distance.
///
/// For each requested component cc', entry (i, j) of the returned matrix is
/// `3·Δc·Δc' / R⁵ - δ(c = c') / R³`. The three diagonal components satisfy
/// the Laplace identity `Gxx + Gyy + Gzz = 0` away from the sources.
///
/// Components may repeat; each distinct component is computed once and
/// repeated requests receive identical copies.
///
/// # Arguments
/// * `data_points` - D observation points.
/// * `source_points` - P source points.
/// * `sedm` - D×P squared-distance matrix for the same two point sets.
/// * `components` - Requested components; pass [`TensorComponent::ALL`] for
///   all six.
///
/// # Returns
/// One D×P matrix per requested component, in request order.
pub fn grad_tensor(
    data_points: &PointSet,
    source_points: &PointSet,
    sedm: &Mat<f64>,
    components: &[TensorComponent],
) -> GravmagResult<Vec<Mat<f64>>> {
    let num_data = validation::check_point_set(data_points)?;
    let num_sources = validation::check_point_set(source_points)?;
    validation::check_matrix_shape("SEDM", sedm.shape(), (num_data, num_sources))?;

    let inv_r3 = Mat::from_fn(num_data, num_sources, |i, j| {
        let r2 = sedm[(i, j)];
        1.0 / (r2 * r2.sqrt())
    });
    let inv_r5 = Mat::from_fn(num_data, num_sources, |i, j| {
        let r2 = sedm[(i, j)];
        1.0 / (r2 * r2 * r2.sqrt())
    });

    let mut cached: [Option<Mat<f64>>; 6] = [None, None, None, None, None, None];
    let mut matrices = Vec::with_capacity(components.len());
    for &component in components {
        let matrix = cached[component.index()].get_or_insert_with(|| {
            Mat::from_fn(num_data, num_sources, |i, j| {
                let dx = data_points.x[i] - source_points.x[j];
                let dy = data_points.y[i] - source_points.y[j];
                let dz = data_points.z[i] - source_points.z[j];
                let (first, second, diagonal) = match component {
                    TensorComponent::Xx => (dx, dx, true),
                    TensorComponent::Xy => (dx, dy, false),
                    TensorComponent::Xz => (dx, dz, false),
                    TensorComponent::Yy => (dy, dy, true),
                    TensorComponent::Yz => (dy, dz, false),
                    TensorComponent::Zz => (dz, dz, true),
                };
                let mut value = 3.0 * first * second * inv_r5[(i, j)];
                if diagonal {
                    value -= inv_r3[(i, j)];
                }
                value
            })
        });
        matrices.push(matrix.clone());
    }

    Ok(matrices)
}

/// Computes the SEDM between a regular grid and the same grid sunk by
/// `delta_z`, as compact BTTB metadata.
///
/// Observation points are the grid at its own height; sources occupy the
/// identical horizontal positions at depth `grid.z + delta_z`. The squared
/// distance then depends only on the x and y index lags, so only the
/// `Nx + Ny` distinct lags are evaluated.
///
/// # Arguments
/// * `grid` - Regular horizontal observation grid.
/// * `delta_z` - Positive vertical offset between observations and sources.
/// * `ordering` - Traversal ordering of the flattened grid.
///
/// # Returns
/// Metadata reproducing, via [`BttbMetadata::to_dense`], the matrix
/// [`sedm`] would build from the expanded grids.
pub fn sedm_bttb(
    grid: &RegularGrid,
    delta_z: f64,
    ordering: GridOrdering,
) -> GravmagResult<BttbMetadata> {
    let (nx, ny) = validation::check_regular_grid(grid)?;
    validation::check_vertical_offset(delta_z)?;

    let x_lags = grid.x_lags();
    let y_lags = grid.y_lags();

    let metadata = assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Even, |ix, iy| {
        let lx = x_lags[ix];
        let ly = y_lags[iy];
        lx * lx + ly * ly + delta_z * delta_z
    })?;
    Ok(metadata)
}

/// Computes first-derivative kernels over a regular grid as BTTB metadata.
///
/// The grid geometry matches [`sedm_bttb`]; the squared distances are read
/// back from its metadata rather than recomputed. Kernels that are odd in a
/// lag direction (the x kernel along x, the y kernel along y) are stored
/// over the full signed lag range; all other axes store non-negative lags
/// only.
///
/// # Arguments
/// * `grid` - Regular horizontal observation grid.
/// * `delta_z` - Positive vertical offset between observations and sources.
/// * `sedm` - Metadata previously produced by [`sedm_bttb`] for the same
///   grid, offset and ordering.
/// * `ordering` - Traversal ordering of the flattened grid.
/// * `components` - Requested components; repeats receive identical copies.
///
/// # Returns
/// One metadata record per requested component, in request order.
pub fn grad_bttb(
    grid: &RegularGrid,
    delta_z: f64,
    sedm: &BttbMetadata,
    ordering: GridOrdering,
    components: &[FieldComponent],
) -> GravmagResult<Vec<BttbMetadata>> {
    let (nx, ny) = validation::check_regular_grid(grid)?;
    validation::check_vertical_offset(delta_z)?;
    check_sedm_metadata(sedm, nx, ny, ordering)?;

    let x_lags = grid.x_lags();
    let y_lags = grid.y_lags();
    let r2 = lag_squared_distances(sedm, nx, ny, ordering);
    let inv_r3 = Mat::from_fn(ny, nx, |iy, ix| {
        let value = r2[(iy, ix)];
        1.0 / (value * value.sqrt())
    });

    let mut cached: [Option<BttbMetadata>; 3] = [None, None, None];
    let mut metadata = Vec::with_capacity(components.len());
    for &component in components {
        let entry = match &cached[component.index()] {
            Some(existing) => existing.clone(),
            None => {
                let built = match component {
                    FieldComponent::X => {
                        assemble_bttb(nx, ny, ordering, Parity::Odd, Parity::Even, |ix, iy| {
                            -x_lags[ix] * inv_r3[(iy, ix)]
                        })?
                    }
                    FieldComponent::Y => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Odd, |ix, iy| {
                            -y_lags[iy] * inv_r3[(iy, ix)]
                        })?
                    }
                    FieldComponent::Z => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Even, |ix, iy| {
                            delta_z * inv_r3[(iy, ix)]
                        })?
                    }
                };
                cached[component.index()] = Some(built.clone());
                built
            }
        };
        metadata.push(entry);
    }

    Ok(metadata)
}

/// Computes second-derivative kernels over a regular grid as BTTB metadata.
///
/// The grid geometry matches [`sedm_bttb`]; the squared distances are read
/// back from its metadata. The xy kernel is odd in both lag directions, the
/// xz and yz kernels are odd in their horizontal lag, and the diagonal
/// components are even in both.
///
/// # Arguments
/// * `grid` - Regular horizontal observation grid.
/// * `delta_z` - Positive vertical offset between observations and sources.
/// * `sedm` - Metadata previously produced by [`sedm_bttb`] for the same
///   grid, offset and ordering.
/// * `ordering` - Traversal ordering of the flattened grid.
/// * `components` - Requested components; repeats receive identical copies.
///
/// # Returns
/// One metadata record per requested component, in request order.
pub fn grad_tensor_bttb(
    grid: &RegularGrid,
    delta_z: f64,
    sedm: &BttbMetadata,
    ordering: GridOrdering,
    components: &[TensorComponent],
) -> GravmagResult<Vec<BttbMetadata>> {
    let (nx, ny) = validation::check_regular_grid(grid)?;
    validation::check_vertical_offset(delta_z)?;
    check_sedm_metadata(sedm, nx, ny, ordering)?;

    let x_lags = grid.x_lags();
    let y_lags = grid.y_lags();
    let r2 = lag_squared_distances(sedm, nx, ny, ordering);
    let inv_r3 = Mat::from_fn(ny, nx, |iy, ix| {
        let value = r2[(iy, ix)];
        1.0 / (value * value.sqrt())
    });
    let inv_r5 = Mat::from_fn(ny, nx, |iy, ix| {
        let value = r2[(iy, ix)];
        1.0 / (value * value * value.sqrt())
    });

    // Vertical coordinate difference observation minus source.
    let dz = -delta_z;

    let mut cached: [Option<BttbMetadata>; 6] = [None, None, None, None, None, None];
    let mut metadata = Vec::with_capacity(components.len());
    for &component in components {
        let entry = match &cached[component.index()] {
            Some(existing) => existing.clone(),
            None => {
                let built = match component {
                    TensorComponent::Xx => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Even, |ix, iy| {
                            3.0 * x_lags[ix] * x_lags[ix] * inv_r5[(iy, ix)] - inv_r3[(iy, ix)]
                        })?
                    }
                    TensorComponent::Xy => {
                        assemble_bttb(nx, ny, ordering, Parity::Odd, Parity::Odd, |ix, iy| {
                            3.0 * x_lags[ix] * y_lags[iy] * inv_r5[(iy, ix)]
                        })?
                    }
                    TensorComponent::Xz => {
                        assemble_bttb(nx, ny, ordering, Parity::Odd, Parity::Even, |ix, iy| {
                            3.0 * x_lags[ix] * dz * inv_r5[(iy, ix)]
                        })?
                    }
                    TensorComponent::Yy => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Even, |ix, iy| {
                            3.0 * y_lags[iy] * y_lags[iy] * inv_r5[(iy, ix)] - inv_r3[(iy, ix)]
                        })?
                    }
                    TensorComponent::Yz => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Odd, |ix, iy| {
                            3.0 * y_lags[iy] * dz * inv_r5[(iy, ix)]
                        })?
                    }
                    TensorComponent::Zz => {
                        assemble_bttb(nx, ny, ordering, Parity::Even, Parity::Even, |ix, iy| {
                            3.0 * dz * dz * inv_r5[(iy, ix)] - inv_r3[(iy, ix)]
                        })?
                    }
                };
                cached[component.index()] = Some(built.clone());
                built
            }
        };
        metadata.push(entry);
    }

    Ok(metadata)
}

/// Parity of a lag kernel along one grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    Even,
    Odd,
}

/// Number of stored lags for an axis of `n` samples.
#[inline(always)]
fn stored_lag_count(parity: Parity, n: usize) -> usize {
    match parity {
        Parity::Even => n,
        Parity::Odd => 2 * n - 1,
    }
}

/// Maps a storage index to its non-negative lag index and sign factor.
///
/// Even axes store lags `0..n` directly. Odd axes store the signed range
/// `-(n-1)..=n-1` in ascending order; the kernel value at a negative lag is
/// the negated value at the mirrored positive lag.
#[inline(always)]
fn signed_lag(parity: Parity, n: usize, index: usize) -> (usize, f64) {
    match parity {
        Parity::Even => (index, 1.0),
        Parity::Odd => {
            let lag = index as isize - (n as isize - 1);
            let sign = match lag < 0 {
                true => -1.0,
                false => 1.0,
            };
            (lag.unsigned_abs(), sign)
        }
    }
}

/// Builds BTTB metadata from a kernel evaluated at non-negative lag pairs.
///
/// `kernel(ix, iy)` must return the value at x lag index `ix` and y lag
/// index `iy`; the per-axis parities determine storage layout and the sign
/// mirroring applied for negative lags. The `ordering` decides which axis
/// forms the block structure: blocks follow y under [`GridOrdering::Xy`]
/// and x under [`GridOrdering::Yx`].
fn assemble_bttb(
    nx: usize,
    ny: usize,
    ordering: GridOrdering,
    parity_x: Parity,
    parity_y: Parity,
    kernel: impl Fn(usize, usize) -> f64,
) -> Result<BttbMetadata, BttbError> {
    let (num_blocks, block_size, block_parity, entry_parity) = match ordering {
        GridOrdering::Xy => (ny, nx, parity_y, parity_x),
        GridOrdering::Yx => (nx, ny, parity_x, parity_y),
    };

    let stored_rows = stored_lag_count(block_parity, num_blocks);
    let stored_cols = stored_lag_count(entry_parity, block_size);

    let mut values = Mat::zeros(stored_rows, stored_cols);
    for (row, column) in iproduct!(0..stored_rows, 0..stored_cols) {
        let (block_lag, block_sign) = signed_lag(block_parity, num_blocks, row);
        let (entry_lag, entry_sign) = signed_lag(entry_parity, block_size, column);
        let (ix, iy) = match ordering {
            GridOrdering::Xy => (entry_lag, block_lag),
            GridOrdering::Yx => (block_lag, entry_lag),
        };
        values[(row, column)] = block_sign * entry_sign * kernel(ix, iy);
    }

    BttbMetadata::new(
        block_parity == Parity::Even,
        entry_parity == Parity::Even,
        num_blocks,
        block_size,
        values,
    )
}

/// Checks that SEDM metadata matches the grid shape and ordering.
fn check_sedm_metadata(
    sedm: &BttbMetadata,
    nx: usize,
    ny: usize,
    ordering: GridOrdering,
) -> Result<(), ValidationError> {
    if !sedm.symmetric_blocks() || !sedm.symmetric_entries() {
        return Err(ValidationError::MetadataMismatch {
            reason: "squared-distance metadata must be symmetric along both axes",
        });
    }
    let expected = match ordering {
        GridOrdering::Xy => (ny, nx),
        GridOrdering::Yx => (nx, ny),
    };
    validation::check_matrix_shape(
        "squared-distance metadata",
        (sedm.num_blocks(), sedm.block_size()),
        expected,
    )
}

/// Reads the non-negative-lag squared distances out of SEDM metadata into a
/// `(Ny, Nx)` grid indexed `(iy, ix)` regardless of the ordering.
fn lag_squared_distances(
    sedm: &BttbMetadata,
    nx: usize,
    ny: usize,
    ordering: GridOrdering,
) -> Mat<f64> {
    let values = sedm.values().to_owned();
    Mat::from_fn(ny, nx, |iy, ix| match ordering {
        GridOrdering::Xy => values[(iy, ix)],
        GridOrdering::Yx => values[(ix, iy)],
    })
}
