//! Low-level building blocks of the eigenvalue solver.
//!
//! - [`qr`]: Householder reflectors and the lazy `Q R` factorization.
//! - [`shift`]: shift strategies applied before each QR step.
//! - [`eigen`]: the shifted QR iteration itself.
//!
//! Types shared between the modules live here.

pub mod eigen;
pub mod qr;
pub mod shift;

use crate::matrix::Table;

/// A callback invoked after every completed QR iteration with the number of
/// iterations performed so far and the current working matrix.
///
/// Returning `false` stops the iteration early.
pub type IterationCallback<'a> = dyn FnMut(usize, &Table) -> bool + 'a;

/// The state in which [`eigen::shifted_qr_iteration`] left the working matrix.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    /// The last working matrix. Its diagonal approximates the eigenvalues.
    pub table: Table,
    /// The number of QR iterations that were performed.
    pub iterations: usize,
    /// Whether every entry below the diagonal fell under the sensitivity.
    pub converged: bool,
}
