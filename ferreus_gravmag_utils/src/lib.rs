/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports geometry value types and validation helpers used across the ferreus_gravmag crates.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`ferreus_gravmag`] crate
//!
//! Shared value types describing observation/source geometry (scattered point
//! sets and regular horizontal grids) together with the structural validation
//! checks consumed at the entry points of the kernel generators and solvers.
//!
//! [`ferreus_gravmag`]: https://docs.rs/ferreus_gravmag

mod geometry;

pub mod validation;

pub use {
    geometry::{GridOrdering, PointSet, RegularGrid},
    validation::ValidationError,
};
