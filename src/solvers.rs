//! This module provides a high-level, user-friendly API for the QR factorization
//! and the shifted QR eigenvalue iteration.

use crate::{
    algorithms::{
        eigen::shifted_qr_iteration,
        qr::{self, QrDecomposition},
        shift::{ShiftStrategy, WilkinsonShift},
    },
    error::{LinalgError, ensure_shape, invalid_input},
    matrix::{MatrixRef, ensure_square},
};
use serde::{Deserialize, Serialize};

/// Iteration limits of the eigenvalue solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// The maximum number of QR iterations.
    pub iteration_bound: usize,
    /// Sub-diagonal entries with a smaller magnitude count as zero.
    pub sensitivity: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iteration_bound: 1000,
            sensitivity: 1e-9,
        }
    }
}

impl SolverConfig {
    pub fn with_iteration_bound(mut self, iteration_bound: usize) -> Self {
        self.iteration_bound = iteration_bound;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Checks that the sensitivity is positive and finite.
    pub fn validate(&self) -> Result<(), LinalgError> {
        if self.sensitivity > 0.0 && self.sensitivity.is_finite() {
            Ok(())
        } else {
            Err(invalid_input(format!(
                "sensitivity must be positive and finite, got {}",
                self.sensitivity
            )))
        }
    }
}

/// Everything [`eigenvalues_with`] learned about a matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    /// Eigenvalue estimates, sorted by decreasing magnitude.
    pub eigenvalues: Vec<f64>,
    /// The iteration budget left over; see [`solve`].
    pub remaining: isize,
    /// The number of QR iterations performed.
    pub iterations: usize,
    pub converged: bool,
}

/// Computes `Q` and `R` with `A = Q R`.
///
/// `q` is orthogonal and `r` is upper triangular. `r` is the lazy product
/// `qᵗ · m`; materialize it with [`crate::matrix::Table::materialize`] if it is
/// read repeatedly.
///
/// # Errors
/// Fails with a shape mismatch when `m` is not square.
pub fn qr_decompose(m: &MatrixRef) -> Result<QrDecomposition, LinalgError> {
    qr::qr(m)
}

/// Estimates the eigenvalues of `m` with the shifted QR iteration and writes
/// them to `out`, sorted by decreasing magnitude.
///
/// # Arguments
/// * `m`: A square matrix with real eigenvalues.
/// * `iteration_bound`: The maximum number of QR iterations.
/// * `sensitivity`: Convergence is reached once every entry below the diagonal
///   has a smaller magnitude.
/// * `shift`: The shift strategy, e.g. [`WilkinsonShift`] or a closure.
/// * `out`: Receives the eigenvalues. Its length must equal the size of `m`.
///
/// # Returns
/// The number of iterations left when the iteration converged, which is
/// `0` when convergence took exactly `iteration_bound` iterations, or `-1`
/// when the bound ran out first. `out` holds the best estimates either way.
///
/// Complex eigenvalues cannot be represented: for such matrices the iteration
/// does not converge and `out` is not meaningful.
pub fn solve<S: ShiftStrategy + ?Sized>(
    m: &MatrixRef,
    iteration_bound: usize,
    sensitivity: f64,
    shift: &mut S,
    out: &mut [f64],
) -> Result<isize, LinalgError> {
    ensure_square(m)?;
    ensure_shape("eigenvalue buffer", m.row_size(), out.len())?;

    let config = SolverConfig {
        iteration_bound,
        sensitivity,
    };
    let report = eigenvalues_with(m, &config, shift)?;
    out.copy_from_slice(&report.eigenvalues);
    Ok(report.remaining)
}

/// Like [`solve`], but allocates the result and reports the iteration count.
pub fn eigenvalues_with<S: ShiftStrategy + ?Sized>(
    m: &MatrixRef,
    config: &SolverConfig,
    shift: &mut S,
) -> Result<SolveReport, LinalgError> {
    config.validate()?;
    let outcome = shifted_qr_iteration(m, config.iteration_bound, config.sensitivity, shift, None)?;

    let mut eigenvalues = outcome.table.diagonal();
    sort_by_magnitude(&mut eigenvalues);

    let remaining = if outcome.converged {
        let left = config.iteration_bound.saturating_sub(outcome.iterations);
        isize::try_from(left).unwrap_or(isize::MAX)
    } else {
        -1
    };

    Ok(SolveReport {
        eigenvalues,
        remaining,
        iterations: outcome.iterations,
        converged: outcome.converged,
    })
}

/// [`eigenvalues_with`] using the Wilkinson shift.
pub fn eigenvalues(m: &MatrixRef, config: &SolverConfig) -> Result<SolveReport, LinalgError> {
    eigenvalues_with(m, config, &mut WilkinsonShift)
}

/// Sorts by decreasing absolute value. Ties keep their order.
pub fn sort_by_magnitude(values: &mut [f64]) {
    values.sort_by(|a, b| b.abs().total_cmp(&a.abs()));
}
