/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the crate-level error type wrapping validation and BTTB codec failures.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_bttb::BttbError;
use ferreus_gravmag_utils::ValidationError;
use std::error::Error;
use std::fmt;

/// Result alias used by the fallible operations of this crate.
pub type GravmagResult<T> = std::result::Result<T, GravmagError>;

/// Errors returned by the kernel generators and solvers.
///
/// All variants describe problems detected eagerly, before numeric work
/// begins. Numeric singularities (coincident points) and solver
/// non-convergence are reported through values, never through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum GravmagError {
    /// A structural check on an input rejected it.
    Validation(ValidationError),

    /// Structured-matrix metadata could not be constructed or consumed.
    Bttb(BttbError),
}

impl fmt::Display for GravmagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GravmagError::Validation(source) => write!(f, "invalid input: {}", source),
            GravmagError::Bttb(source) => write!(f, "BTTB metadata error: {}", source),
        }
    }
}

impl Error for GravmagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GravmagError::Validation(source) => Some(source),
            GravmagError::Bttb(source) => Some(source),
        }
    }
}

impl From<ValidationError> for GravmagError {
    fn from(source: ValidationError) -> Self {
        GravmagError::Validation(source)
    }
}

impl From<BttbError> for GravmagError {
    fn from(source: BttbError) -> Self {
        GravmagError::Bttb(source)
    }
}
