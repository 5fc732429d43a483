/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the point-set and regular-grid value types describing observation and source geometry.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A set of points in 3D space, stored as one coordinate vector per axis.
///
/// Represents either observation (data) points or equivalent sources. The
/// x-axis points north, the y-axis east and the z-axis down, so deeper
/// sources have larger `z` values.
///
/// All three vectors must have the same non-zero length; use
/// [`PointSet::new`] to construct a checked instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    /// Coordinates along the x (northing) axis.
    pub x: Vec<f64>,

    /// Coordinates along the y (easting) axis.
    pub y: Vec<f64>,

    /// Coordinates along the z (depth, positive down) axis.
    pub z: Vec<f64>,
}

impl PointSet {
    /// Creates a new point set after checking that all three coordinate
    /// vectors share the same non-zero length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, ValidationError> {
        let points = Self { x, y, z };
        validation::check_point_set(&points)?;
        Ok(points)
    }

    /// Returns the number of points in the set.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` when the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Returns a copy of the set with every point shifted vertically by
    /// `offset` (positive values sink the points).
    pub fn translate_z(&self, offset: f64) -> PointSet {
        PointSet {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.iter().map(|value| value + offset).collect(),
        }
    }
}

/// Traversal ordering used when flattening a regular grid into a point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridOrdering {
    /// The x coordinate varies fastest along the flattened sequence
    /// (rows of constant y are laid out one after another).
    Xy,

    /// The y coordinate varies fastest along the flattened sequence
    /// (columns of constant x are laid out one after another).
    Yx,
}

impl GridOrdering {
    /// Returns the lowercase label of this ordering.
    pub fn label(self) -> &'static str {
        match self {
            GridOrdering::Xy => "xy",
            GridOrdering::Yx => "yx",
        }
    }
}

impl FromStr for GridOrdering {
    type Err = ValidationError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "xy" => Ok(GridOrdering::Xy),
            "yx" => Ok(GridOrdering::Yx),
            _ => Err(ValidationError::InvalidOrdering {
                label: label.to_string(),
            }),
        }
    }
}

/// A regular horizontal grid of Nx·Ny points at constant height.
///
/// The grid is described by its ascending, uniformly spaced axis vectors
/// without materializing the full set of Nx·Ny coordinates; use
/// [`RegularGrid::expand`] to obtain the flattened [`PointSet`] in a chosen
/// [`GridOrdering`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularGrid {
    /// Distinct x coordinates, ascending, length Nx.
    pub x: Vec<f64>,

    /// Distinct y coordinates, ascending, length Ny.
    pub y: Vec<f64>,

    /// Common z coordinate of every grid point.
    pub z: f64,

    /// Horizontal extents `[xmin, xmax, ymin, ymax]`.
    pub area: [f64; 4],

    /// Number of points along each axis `(Nx, Ny)`.
    pub shape: (usize, usize),
}

impl RegularGrid {
    /// Creates a grid by subdividing `area = [xmin, xmax, ymin, ymax]` into
    /// `shape = (Nx, Ny)` uniformly spaced samples at height `z`.
    pub fn new(area: [f64; 4], shape: (usize, usize), z: f64) -> Result<Self, ValidationError> {
        let (nx, ny) = shape;
        let grid = Self {
            x: subdivide(area[0], area[1], nx),
            y: subdivide(area[2], area[3], ny),
            z,
            area,
            shape,
        };
        validation::check_regular_grid(&grid)?;
        Ok(grid)
    }

    /// Creates a grid from explicit axis vectors, deriving `area` and
    /// `shape` from them. The axes must be ascending and uniformly spaced.
    pub fn from_axes(x: Vec<f64>, y: Vec<f64>, z: f64) -> Result<Self, ValidationError> {
        if x.is_empty() {
            return Err(ValidationError::EmptyAxis { axis: "x" });
        }
        if y.is_empty() {
            return Err(ValidationError::EmptyAxis { axis: "y" });
        }
        let area = [x[0], x[x.len() - 1], y[0], y[y.len() - 1]];
        let shape = (x.len(), y.len());
        let grid = Self { x, y, z, area, shape };
        validation::check_regular_grid(&grid)?;
        Ok(grid)
    }

    /// Returns the number of points along the x axis.
    pub fn nx(&self) -> usize {
        self.shape.0
    }

    /// Returns the number of points along the y axis.
    pub fn ny(&self) -> usize {
        self.shape.1
    }

    /// Returns the total number of grid points Nx·Ny.
    pub fn num_points(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    /// Materializes the full grid as a flattened [`PointSet`] in the
    /// requested traversal ordering.
    pub fn expand(&self, ordering: GridOrdering) -> PointSet {
        let total = self.num_points();
        let mut x = Vec::with_capacity(total);
        let mut y = Vec::with_capacity(total);

        match ordering {
            GridOrdering::Xy => {
                for &yj in &self.y {
                    for &xi in &self.x {
                        x.push(xi);
                        y.push(yj);
                    }
                }
            }
            GridOrdering::Yx => {
                for &xi in &self.x {
                    for &yj in &self.y {
                        x.push(xi);
                        y.push(yj);
                    }
                }
            }
        }

        PointSet {
            x,
            y,
            z: vec![self.z; total],
        }
    }

    /// Returns the non-negative x lags `x[i] - x[0]` for `i = 0..Nx`.
    pub fn x_lags(&self) -> Vec<f64> {
        lags(&self.x)
    }

    /// Returns the non-negative y lags `y[j] - y[0]` for `j = 0..Ny`.
    pub fn y_lags(&self) -> Vec<f64> {
        lags(&self.y)
    }
}

/// Uniform subdivision of `[start, end]` into `count` samples.
fn subdivide(start: f64, end: f64, count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![start];
    }
    let step = (end - start) / (count as f64 - 1.0);
    (0..count).map(|i| start + step * i as f64).collect()
}

fn lags(axis: &[f64]) -> Vec<f64> {
    let origin = axis[0];
    axis.iter().map(|value| value - origin).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_set_rejects_mismatched_lengths() {
        let result = PointSet::new(vec![0.0, 1.0], vec![0.0], vec![0.0, 1.0]);
        assert!(matches!(
            result,
            Err(ValidationError::CoordinateLengthMismatch { x: 2, y: 1, z: 2 })
        ));
    }

    #[test]
    fn point_set_rejects_empty() {
        let result = PointSet::new(vec![], vec![], vec![]);
        assert!(matches!(result, Err(ValidationError::EmptyPointSet)));
    }

    #[test]
    fn translate_z_shifts_only_the_vertical_axis() {
        let points = PointSet::new(vec![1.0, 2.0], vec![3.0, 4.0], vec![0.0, 5.0]).unwrap();
        let sunk = points.translate_z(10.0);
        assert_eq!(sunk.x, points.x);
        assert_eq!(sunk.y, points.y);
        assert_eq!(sunk.z, vec![10.0, 15.0]);
    }

    #[test]
    fn ordering_parses_known_labels_only() {
        assert_eq!("xy".parse::<GridOrdering>().unwrap(), GridOrdering::Xy);
        assert_eq!("yx".parse::<GridOrdering>().unwrap(), GridOrdering::Yx);
        assert!("xz".parse::<GridOrdering>().is_err());
        assert!("XY".parse::<GridOrdering>().is_err());
    }

    #[test]
    fn grid_new_builds_uniform_axes() {
        let grid = RegularGrid::new([0.0, 4.0, 10.0, 12.0], (5, 3), 30.0).unwrap();
        assert_eq!(grid.x, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.y, vec![10.0, 11.0, 12.0]);
        assert_eq!(grid.num_points(), 15);
    }

    #[test]
    fn grid_from_axes_derives_area_and_shape() {
        let grid =
            RegularGrid::from_axes(vec![10.0, 20.0, 30.0], vec![15.0, 30.0], 4.0).unwrap();
        assert_eq!(grid.area, [10.0, 30.0, 15.0, 30.0]);
        assert_eq!(grid.shape, (3, 2));
    }

    #[test]
    fn grid_from_axes_rejects_irregular_spacing() {
        let result = RegularGrid::from_axes(vec![0.0, 1.0, 3.0], vec![0.0, 1.0], 0.0);
        assert!(matches!(
            result,
            Err(ValidationError::IrregularSpacing { axis: "x", .. })
        ));
    }

    #[test]
    fn expand_orders_points_as_requested() {
        let grid = RegularGrid::from_axes(vec![0.0, 1.0, 2.0], vec![10.0, 20.0], 5.0).unwrap();

        let xy = grid.expand(GridOrdering::Xy);
        assert_eq!(xy.x, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(xy.y, vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
        assert_eq!(xy.z, vec![5.0; 6]);

        let yx = grid.expand(GridOrdering::Yx);
        assert_eq!(yx.x, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(yx.y, vec![10.0, 20.0, 10.0, 20.0, 10.0, 20.0]);
    }

    #[test]
    fn lags_are_relative_to_the_first_sample() {
        let grid = RegularGrid::from_axes(vec![10.0, 20.0, 30.0], vec![15.0, 30.0], 4.0).unwrap();
        assert_eq!(grid.x_lags(), vec![0.0, 10.0, 20.0]);
        assert_eq!(grid.y_lags(), vec![0.0, 15.0]);
    }
}
