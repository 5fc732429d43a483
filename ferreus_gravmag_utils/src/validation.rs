/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the structural validation checks consumed at kernel-generator and solver entry points.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Structural checks on point sets, grids, matrices and scalars.
//!
//! Every check runs eagerly, before any numeric work, and reports the first
//! broken constraint through [`ValidationError`]. Numeric singularities
//! (e.g. coincident observation and source points) are deliberately not
//! checked here; they propagate as IEEE infinities through the kernels.

use crate::geometry::{PointSet, RegularGrid};
use faer::Mat;
use std::error::Error;
use std::fmt;

/// Relative tolerance used when comparing axis spacing and area bounds.
const SPACING_TOLERANCE: f64 = 1e-9;

/// Errors raised by the structural input checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The three coordinate vectors of a point set differ in length.
    CoordinateLengthMismatch { x: usize, y: usize, z: usize },

    /// A point set holds no points.
    EmptyPointSet,

    /// A grid axis holds no samples.
    EmptyAxis { axis: &'static str },

    /// A grid axis length disagrees with the declared shape.
    AxisLengthMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    /// A grid axis is not strictly ascending.
    NotAscending { axis: &'static str },

    /// A grid axis is not uniformly spaced.
    IrregularSpacing { axis: &'static str, index: usize },

    /// A grid area bound disagrees with the corresponding axis endpoint.
    AreaMismatch {
        axis: &'static str,
        bound: f64,
        coordinate: f64,
    },

    /// A scalar argument is NaN or infinite.
    NonFiniteScalar { name: &'static str, value: f64 },

    /// A scalar argument that must be positive is zero or negative.
    NonPositiveScalar { name: &'static str, value: f64 },

    /// An iteration limit of zero was requested.
    ZeroIterationLimit,

    /// A matrix argument does not have the required shape.
    MatrixShapeMismatch {
        name: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A derivative component label is not one of the supported set.
    InvalidComponent { label: String },

    /// A grid ordering label is not one of the supported set.
    InvalidOrdering { label: String },

    /// Structured-matrix metadata does not describe the expected operator.
    MetadataMismatch { reason: &'static str },

    /// A stacked sensitivity system holds no datasets.
    EmptySystem,

    /// The matrix and data-vector lists of a stacked system differ in length.
    DatasetCountMismatch { matrices: usize, data_vectors: usize },

    /// A sensitivity matrix does not share the common parameter count.
    ColumnCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A data vector is not a single column.
    NotColumnVector { index: usize, columns: usize },

    /// A sensitivity matrix row count disagrees with its paired data vector.
    DataLengthMismatch {
        index: usize,
        matrix_rows: usize,
        data_rows: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CoordinateLengthMismatch { x, y, z } => write!(
                f,
                "point set coordinate vectors must share one length (x: {}, y: {}, z: {})",
                x, y, z
            ),
            ValidationError::EmptyPointSet => {
                write!(f, "point set must hold at least one point")
            }
            ValidationError::EmptyAxis { axis } => {
                write!(f, "grid axis '{}' must hold at least one sample", axis)
            }
            ValidationError::AxisLengthMismatch {
                axis,
                expected,
                found,
            } => write!(
                f,
                "grid axis '{}' has {} samples but the shape declares {}",
                axis, found, expected
            ),
            ValidationError::NotAscending { axis } => {
                write!(f, "grid axis '{}' must be strictly ascending", axis)
            }
            ValidationError::IrregularSpacing { axis, index } => write!(
                f,
                "grid axis '{}' is not uniformly spaced at sample {}",
                axis, index
            ),
            ValidationError::AreaMismatch {
                axis,
                bound,
                coordinate,
            } => write!(
                f,
                "grid area bound {} on axis '{}' disagrees with the axis endpoint {}",
                bound, axis, coordinate
            ),
            ValidationError::NonFiniteScalar { name, value } => {
                write!(f, "'{}' must be finite (got {})", name, value)
            }
            ValidationError::NonPositiveScalar { name, value } => {
                write!(f, "'{}' must be positive (got {})", name, value)
            }
            ValidationError::ZeroIterationLimit => {
                write!(f, "iteration limit must be at least 1")
            }
            ValidationError::MatrixShapeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "{} has shape ({}, {}) but ({}, {}) was expected",
                name, found.0, found.1, expected.0, expected.1
            ),
            ValidationError::InvalidComponent { label } => {
                write!(f, "unknown derivative component '{}'", label)
            }
            ValidationError::InvalidOrdering { label } => {
                write!(f, "unknown grid ordering '{}' (expected 'xy' or 'yx')", label)
            }
            ValidationError::MetadataMismatch { reason } => {
                write!(f, "structured-matrix metadata mismatch: {}", reason)
            }
            ValidationError::EmptySystem => {
                write!(f, "sensitivity system must hold at least one dataset")
            }
            ValidationError::DatasetCountMismatch {
                matrices,
                data_vectors,
            } => write!(
                f,
                "sensitivity system has {} matrices but {} data vectors",
                matrices, data_vectors
            ),
            ValidationError::ColumnCountMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "sensitivity matrix {} has {} columns but the system shares {}",
                index, found, expected
            ),
            ValidationError::NotColumnVector { index, columns } => write!(
                f,
                "data vector {} must be a single column (got {} columns)",
                index, columns
            ),
            ValidationError::DataLengthMismatch {
                index,
                matrix_rows,
                data_rows,
            } => write!(
                f,
                "sensitivity matrix {} has {} rows but its data vector has {}",
                index, matrix_rows, data_rows
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a point set and returns the number of points it holds.
pub fn check_point_set(points: &PointSet) -> Result<usize, ValidationError> {
    let (x, y, z) = (points.x.len(), points.y.len(), points.z.len());
    if x != y || x != z {
        return Err(ValidationError::CoordinateLengthMismatch { x, y, z });
    }
    if x == 0 {
        return Err(ValidationError::EmptyPointSet);
    }
    Ok(x)
}

/// Checks a regular grid and returns its `(Nx, Ny)` shape.
///
/// Both axes must match the declared shape, ascend with uniform spacing and
/// agree with the `area` bounds.
pub fn check_regular_grid(grid: &RegularGrid) -> Result<(usize, usize), ValidationError> {
    let (nx, ny) = grid.shape;
    check_axis("x", &grid.x, nx, grid.area[0], grid.area[1])?;
    check_axis("y", &grid.y, ny, grid.area[2], grid.area[3])?;
    Ok((nx, ny))
}

fn check_axis(
    axis: &'static str,
    values: &[f64],
    expected_len: usize,
    lower: f64,
    upper: f64,
) -> Result<(), ValidationError> {
    if values.is_empty() || expected_len == 0 {
        return Err(ValidationError::EmptyAxis { axis });
    }
    if values.len() != expected_len {
        return Err(ValidationError::AxisLengthMismatch {
            axis,
            expected: expected_len,
            found: values.len(),
        });
    }

    let first = values[0];
    let last = values[values.len() - 1];
    let span = last - first;
    if values.len() > 1 && span <= 0.0 {
        return Err(ValidationError::NotAscending { axis });
    }

    let step = match values.len() > 1 {
        true => span / (values.len() as f64 - 1.0),
        false => 0.0,
    };
    let tolerance = step.abs() * SPACING_TOLERANCE + f64::EPSILON;
    for (index, pair) in values.windows(2).enumerate() {
        let difference = pair[1] - pair[0];
        if difference <= 0.0 {
            return Err(ValidationError::NotAscending { axis });
        }
        if (difference - step).abs() > tolerance {
            return Err(ValidationError::IrregularSpacing {
                axis,
                index: index + 1,
            });
        }
    }

    let bound_tolerance = span.abs().max(1.0) * SPACING_TOLERANCE;
    for (bound, coordinate) in [(lower, first), (upper, last)] {
        if (bound - coordinate).abs() > bound_tolerance {
            return Err(ValidationError::AreaMismatch {
                axis,
                bound,
                coordinate,
            });
        }
    }

    Ok(())
}

/// Checks that a vertical offset between grids is finite and positive.
pub fn check_vertical_offset(delta_z: f64) -> Result<(), ValidationError> {
    check_positive_scalar("delta_z", delta_z)
}

/// Checks that a scalar is finite and strictly positive.
pub fn check_positive_scalar(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteScalar { name, value });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveScalar { name, value });
    }
    Ok(())
}

/// Checks that an iteration limit allows at least one iteration.
pub fn check_iteration_limit(limit: usize) -> Result<(), ValidationError> {
    match limit {
        0 => Err(ValidationError::ZeroIterationLimit),
        _ => Ok(()),
    }
}

/// Checks that a matrix has the expected `(rows, columns)` shape.
pub fn check_matrix_shape(
    name: &'static str,
    found: (usize, usize),
    expected: (usize, usize),
) -> Result<(), ValidationError> {
    if found != expected {
        return Err(ValidationError::MatrixShapeMismatch {
            name,
            expected,
            found,
        });
    }
    Ok(())
}

/// Checks a stacked sensitivity system and returns the shared parameter
/// count P.
///
/// The matrix and data-vector lists must be non-empty and equally long,
/// every matrix must share the column count of the first, every data vector
/// must be a single column, and each matrix/vector pair must agree on its
/// row count.
pub fn check_sensitivity_system(
    matrices: &[Mat<f64>],
    data_vectors: &[Mat<f64>],
) -> Result<usize, ValidationError> {
    if matrices.is_empty() {
        return Err(ValidationError::EmptySystem);
    }
    if matrices.len() != data_vectors.len() {
        return Err(ValidationError::DatasetCountMismatch {
            matrices: matrices.len(),
            data_vectors: data_vectors.len(),
        });
    }

    let num_parameters = matrices[0].ncols();
    for (index, (matrix, data)) in matrices.iter().zip(data_vectors.iter()).enumerate() {
        if matrix.ncols() != num_parameters {
            return Err(ValidationError::ColumnCountMismatch {
                index,
                expected: num_parameters,
                found: matrix.ncols(),
            });
        }
        if data.ncols() != 1 {
            return Err(ValidationError::NotColumnVector {
                index,
                columns: data.ncols(),
            });
        }
        if matrix.nrows() != data.nrows() {
            return Err(ValidationError::DataLengthMismatch {
                index,
                matrix_rows: matrix.nrows(),
                data_rows: data.nrows(),
            });
        }
    }

    Ok(num_parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RegularGrid;

    #[test]
    fn grid_with_wrong_shape_is_rejected() {
        let mut grid =
            RegularGrid::from_axes(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], 0.0).unwrap();
        grid.shape = (4, 2);
        assert!(matches!(
            check_regular_grid(&grid),
            Err(ValidationError::AxisLengthMismatch {
                axis: "x",
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn grid_with_stale_area_is_rejected() {
        let mut grid =
            RegularGrid::from_axes(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], 0.0).unwrap();
        grid.area = [0.0, 3.0, 0.0, 1.0];
        assert!(matches!(
            check_regular_grid(&grid),
            Err(ValidationError::AreaMismatch { axis: "x", .. })
        ));
    }

    #[test]
    fn descending_axis_is_rejected() {
        let result = RegularGrid::from_axes(vec![2.0, 1.0, 0.0], vec![0.0, 1.0], 0.0);
        assert!(matches!(
            result,
            Err(ValidationError::NotAscending { axis: "x" })
        ));
    }

    #[test]
    fn scalar_checks_cover_sign_and_finiteness() {
        assert!(check_positive_scalar("epsilon", 0.5).is_ok());
        assert!(matches!(
            check_positive_scalar("epsilon", 0.0),
            Err(ValidationError::NonPositiveScalar { name: "epsilon", .. })
        ));
        assert!(matches!(
            check_positive_scalar("delta_z", f64::NAN),
            Err(ValidationError::NonFiniteScalar { name: "delta_z", .. })
        ));
        assert!(check_iteration_limit(1).is_ok());
        assert!(matches!(
            check_iteration_limit(0),
            Err(ValidationError::ZeroIterationLimit)
        ));
    }

    #[test]
    fn sensitivity_system_checks_each_constraint() {
        let matrices = vec![Mat::<f64>::zeros(4, 5), Mat::<f64>::zeros(6, 5)];
        let data = vec![Mat::<f64>::zeros(4, 1), Mat::<f64>::zeros(6, 1)];
        assert_eq!(check_sensitivity_system(&matrices, &data).unwrap(), 5);

        assert!(matches!(
            check_sensitivity_system(&[], &[]),
            Err(ValidationError::EmptySystem)
        ));

        let short_data = vec![Mat::<f64>::zeros(4, 1)];
        assert!(matches!(
            check_sensitivity_system(&matrices, &short_data),
            Err(ValidationError::DatasetCountMismatch {
                matrices: 2,
                data_vectors: 1
            })
        ));

        let ragged = vec![Mat::<f64>::zeros(4, 5), Mat::<f64>::zeros(6, 6)];
        assert!(matches!(
            check_sensitivity_system(&ragged, &data),
            Err(ValidationError::ColumnCountMismatch {
                index: 1,
                expected: 5,
                found: 6
            })
        ));

        let wide_data = vec![Mat::<f64>::zeros(4, 2), Mat::<f64>::zeros(6, 1)];
        assert!(matches!(
            check_sensitivity_system(&matrices, &wide_data),
            Err(ValidationError::NotColumnVector { index: 0, columns: 2 })
        ));

        let mismatched = vec![Mat::<f64>::zeros(4, 1), Mat::<f64>::zeros(7, 1)];
        assert!(matches!(
            check_sensitivity_system(&matrices, &mismatched),
            Err(ValidationError::DataLengthMismatch {
                index: 1,
                matrix_rows: 6,
                data_rows: 7
            })
        ));
    }
}
