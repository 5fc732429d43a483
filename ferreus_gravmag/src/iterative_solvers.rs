/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the CGLS iterative solver for stacked equivalent-layer least-squares systems.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::GravmagResult;
use crate::progress::{ProgressMsg, ProgressSink, progress_from_rel};
use faer::Mat;
use ferreus_gravmag_utils::{ValidationError, validation};
use std::sync::Arc;

/// Outcome of a [`cgls`] solve.
///
/// Reaching the iteration cap is not an error: the best iterate found is
/// returned with `converged` set to `false`.
#[derive(Debug, Clone)]
pub struct CglsSolution {
    /// Estimated parameter vector, one column of length P.
    pub parameters: Mat<f64>,

    /// Number of iterations performed.
    pub iterations: usize,

    /// Final joint residual norm, relative to the stacked data norm.
    pub residual: f64,

    /// Whether the relative residual dropped below the requested tolerance.
    pub converged: bool,
}

/// Conjugate Gradient Least Squares over a stack of sensitivity systems.
///
/// Minimizes `||concat(G_k p - d_k)||²` across all datasets `k` for a single
/// parameter vector `p`, using conjugate gradients on the normal equations
/// without ever forming them. Each iteration computes one joint residual,
/// one search direction and one step length spanning every dataset.
///
/// Iteration stops once the joint residual norm, relative to the stacked
/// data norm, drops below `epsilon`, or after `max_iterations` iterations,
/// whichever comes first.
///
/// # Parameters
/// - `sensitivity_matrices`: One N_k×P matrix per dataset, sharing the
///   parameter count P.
/// - `data_vectors`: One N_k×1 column per dataset, paired by index.
/// - `epsilon`: Positive relative-residual stopping tolerance.
/// - `max_iterations`: Iteration cap; reaching it is a soft stop.
/// - `check_input`: Run the structural input checks before iterating.
/// - `callback`: Optional sink receiving one
///   [`ProgressMsg::SolverIteration`] per iteration and a final
///   [`ProgressMsg::SolverFinished`].
///
/// # Returns
/// The [`CglsSolution`] holding the best iterate, the iteration count, the
/// final relative residual and the convergence flag.
pub fn cgls(
    sensitivity_matrices: &[Mat<f64>],
    data_vectors: &[Mat<f64>],
    epsilon: f64,
    max_iterations: usize,
    check_input: bool,
    callback: Option<Arc<dyn ProgressSink>>,
) -> GravmagResult<CglsSolution> {
    if check_input {
        validation::check_positive_scalar("epsilon", epsilon)?;
        validation::check_iteration_limit(max_iterations)?;
        validation::check_sensitivity_system(sensitivity_matrices, data_vectors)?;
    }
    // The parameter count comes from the first matrix, so an empty stack is
    // rejected even when the caller skips the full checks.
    if sensitivity_matrices.is_empty() {
        return Err(ValidationError::EmptySystem.into());
    }

    let num_parameters = sensitivity_matrices[0].ncols();
    let mut parameters = Mat::<f64>::zeros(num_parameters, 1);

    let data_norm = stacked_norm(data_vectors);
    if data_norm == 0.0 {
        // Zero data is fitted exactly by the zero layer.
        if let Some(sink) = &callback {
            sink.emit(ProgressMsg::SolverFinished {
                iterations: 0,
                residual: 0.0,
                converged: true,
            });
        }
        return Ok(CglsSolution {
            parameters,
            iterations: 0,
            residual: 0.0,
            converged: true,
        });
    }

    // With p = 0 the per-dataset residuals start at the data vectors.
    let mut residuals: Vec<Mat<f64>> = data_vectors.to_vec();

    let gradient = normal_gradient(sensitivity_matrices, &residuals, num_parameters);
    let mut gamma = squared_norm(&gradient);
    let mut direction = gradient;

    let mut residual_norm = 1.0;
    let mut iterations = 0usize;
    let mut converged = residual_norm < epsilon;

    while !converged && iterations < max_iterations {
        let products: Vec<Mat<f64>> = sensitivity_matrices
            .iter()
            .map(|matrix| matrix * &direction)
            .collect();

        let step_denominator: f64 = products.iter().map(squared_norm).sum();
        if step_denominator == 0.0 {
            // The direction no longer changes the prediction: stationary point.
            break;
        }
        let alpha = gamma / step_denominator;

        parameters += direction.clone() * alpha;
        for (residual, product) in residuals.iter_mut().zip(products.iter()) {
            *residual -= &(product.clone() * alpha);
        }

        let next_gradient = normal_gradient(sensitivity_matrices, &residuals, num_parameters);
        let gamma_next = squared_norm(&next_gradient);
        let beta = gamma_next / gamma;
        gamma = gamma_next;
        direction = &next_gradient + &(direction * beta);

        residual_norm = stacked_norm(&residuals) / data_norm;
        iterations += 1;
        converged = residual_norm < epsilon;

        if let Some(sink) = &callback {
            sink.emit(ProgressMsg::SolverIteration {
                iter: iterations,
                residual: residual_norm,
                progress: progress_from_rel(residual_norm, 1.0, epsilon),
            });
        }
    }

    if let Some(sink) = &callback {
        sink.emit(ProgressMsg::SolverFinished {
            iterations,
            residual: residual_norm,
            converged,
        });
    }

    Ok(CglsSolution {
        parameters,
        iterations,
        residual: residual_norm,
        converged,
    })
}

/// Squared Euclidean norm of a column vector.
#[inline(always)]
fn squared_norm(vector: &Mat<f64>) -> f64 {
    vector.col(0).transpose() * vector.col(0)
}

/// Euclidean norm of the vertical concatenation of the given columns.
fn stacked_norm(vectors: &[Mat<f64>]) -> f64 {
    vectors.iter().map(squared_norm).sum::<f64>().sqrt()
}

/// Gradient of the stacked normal equations, `sum_k G_k^T r_k`.
fn normal_gradient(
    matrices: &[Mat<f64>],
    residuals: &[Mat<f64>],
    num_parameters: usize,
) -> Mat<f64> {
    let mut gradient = Mat::<f64>::zeros(num_parameters, 1);
    for (matrix, residual) in matrices.iter().zip(residuals.iter()) {
        gradient += matrix.transpose() * residual.as_ref();
    }
    gradient
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::closure_sink;
    use equator::assert;
    use faer::mat;
    use faer::utils::approx::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Two deterministic, well-conditioned datasets sharing three parameters.
    fn stacked_fixture() -> (Vec<Mat<f64>>, Mat<f64>) {
        let g1 = mat![
            [4.0, 1.0, 0.0],
            [1.0, 5.0, 1.0],
            [0.0, 1.0, 6.0],
            [1.0, 0.0, 1.0f64],
        ];
        let g2 = mat![
            [3.0, 0.5, 0.0],
            [0.5, 4.0, 0.5],
            [0.0, 0.5, 5.0],
            [2.0, 1.0, 0.0],
            [0.0, 2.0, 1.0f64],
        ];
        let truth = mat![[1.0], [-2.0], [0.5f64]];
        (vec![g1, g2], truth)
    }

    #[test]
    fn converges_to_the_known_parameters() {
        let (matrices, truth) = stacked_fixture();
        let data: Vec<Mat<f64>> = matrices.iter().map(|g| g * &truth).collect();

        let solution = cgls(&matrices, &data, 1e-10, 50, true, None).unwrap();

        assert!(solution.converged);
        assert!(solution.iterations < 50);
        assert!(solution.residual < 1e-10);

        let approx_eq = CwiseMat(ApproxEq::eps() * 1.0e8);
        assert!(&solution.parameters ~ &truth);
    }

    #[test]
    fn iteration_cap_is_a_soft_stop() {
        let (matrices, truth) = stacked_fixture();
        let data: Vec<Mat<f64>> = matrices.iter().map(|g| g * &truth).collect();

        let solution = cgls(&matrices, &data, 1e-14, 1, true, None).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
        // One conjugate-gradient step already reduces the residual.
        assert!(solution.residual < 1.0);
    }

    #[test]
    fn zero_data_is_fitted_by_the_zero_layer() {
        let (matrices, _) = stacked_fixture();
        let data = vec![Mat::<f64>::zeros(4, 1), Mat::<f64>::zeros(5, 1)];

        let solution = cgls(&matrices, &data, 1e-8, 10, true, None).unwrap();
        assert!(solution.converged);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.parameters, Mat::<f64>::zeros(3, 1));
    }

    #[test]
    fn validation_rejects_inconsistent_systems_before_iterating() {
        let (matrices, truth) = stacked_fixture();
        let data: Vec<Mat<f64>> = matrices.iter().map(|g| g * &truth).collect();

        // Fewer data vectors than matrices.
        let short = vec![data[0].clone()];
        assert!(matches!(
            cgls(&matrices, &short, 1e-8, 10, true, None),
            Err(crate::GravmagError::Validation(
                ValidationError::DatasetCountMismatch { .. }
            ))
        ));

        // One matrix with the wrong number of columns.
        let ragged = vec![matrices[0].clone(), Mat::<f64>::zeros(5, 4)];
        assert!(matches!(
            cgls(&ragged, &data, 1e-8, 10, true, None),
            Err(crate::GravmagError::Validation(
                ValidationError::ColumnCountMismatch { .. }
            ))
        ));

        // Row count of a matrix disagreeing with its data vector.
        let mismatched = vec![data[0].clone(), Mat::<f64>::zeros(7, 1)];
        assert!(matches!(
            cgls(&matrices, &mismatched, 1e-8, 10, true, None),
            Err(crate::GravmagError::Validation(
                ValidationError::DataLengthMismatch { .. }
            ))
        ));

        // A data "vector" with more than one column.
        let wide = vec![Mat::<f64>::zeros(4, 2), data[1].clone()];
        assert!(matches!(
            cgls(&matrices, &wide, 1e-8, 10, true, None),
            Err(crate::GravmagError::Validation(
                ValidationError::NotColumnVector { .. }
            ))
        ));

        // Invalid scalar knobs.
        assert!(cgls(&matrices, &data, 0.0, 10, true, None).is_err());
        assert!(cgls(&matrices, &data, 1e-8, 0, true, None).is_err());
    }

    #[test]
    fn empty_systems_are_rejected_even_without_checks() {
        let result = cgls(&[], &[], 1e-8, 10, false, None);
        assert!(matches!(
            result,
            Err(crate::GravmagError::Validation(ValidationError::EmptySystem))
        ));
    }

    #[test]
    fn progress_sink_receives_one_event_per_iteration() {
        let (matrices, truth) = stacked_fixture();
        let data: Vec<Mat<f64>> = matrices.iter().map(|g| g * &truth).collect();

        let iteration_events = Arc::new(AtomicUsize::new(0));
        let finished_events = Arc::new(AtomicUsize::new(0));
        let iteration_counter = Arc::clone(&iteration_events);
        let finished_counter = Arc::clone(&finished_events);
        let (sink, handle) = closure_sink(64, move |msg| match msg {
            ProgressMsg::SolverIteration { .. } => {
                iteration_counter.fetch_add(1, Ordering::SeqCst);
            }
            ProgressMsg::SolverFinished { converged, .. } => {
                assert!(converged);
                finished_counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let solution = cgls(&matrices, &data, 1e-10, 50, true, Some(sink)).unwrap();
        handle.join().unwrap();

        assert_eq!(iteration_events.load(Ordering::SeqCst), solution.iterations);
        assert_eq!(finished_events.load(Ordering::SeqCst), 1);
    }
}
