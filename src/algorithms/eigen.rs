//! The shifted QR iteration for eigenvalues.
//!
//! ** NOTE: We recommend using the high-level method [`crate::solvers::solve`] instead. This
//! module is intended for use cases where the working matrix or per-iteration monitoring is
//! required.
//!
//! Each iteration replaces the working matrix `A` by
//!
//! ```text
//! A' = Q'(A - sI)Q'ᵗ + sI        Q' = H_{n-2} ⋯ H_0
//! ```
//!
//! which is similar to `A`. Convergence is checked before every iteration:
//! once every entry strictly below the diagonal has magnitude below the
//! sensitivity, the diagonal holds the eigenvalues.
//!
//! ## Limitations
//!
//! The working matrix stays real. A real matrix with complex eigenvalues keeps
//! a `2 × 2` block on its diagonal that never decouples, so the iteration runs
//! out of its bound and reports non-convergence.

use super::{
    IterationCallback, IterationOutcome,
    qr::{accumulate_reflectors, reflector_chain},
    shift::ShiftStrategy,
};
use crate::error::{LinalgError, invalid_input};
use crate::matrix::{MatrixExt, MatrixRef, Table, ensure_square};
use log::{debug, warn};

/// Runs at most `iteration_bound` shifted QR iterations on `matrix`.
///
/// # Arguments
/// * `matrix`: The square matrix whose eigenvalues are wanted.
/// * `iteration_bound`: The maximum number of QR iterations.
/// * `sensitivity`: The threshold below which a subdiagonal entry counts as zero.
///   Must be positive and finite.
/// * `shift`: The strategy that picks the shift of every iteration.
/// * `callback`: An optional callback invoked after every iteration. Returning
///   `false` stops the iteration.
///
/// # Returns
/// The final working matrix with the number of iterations performed, or a
/// [`LinalgError`] when `matrix` is not square or `sensitivity` is invalid.
/// Running out of iterations is not an error; it shows up as
/// `converged == false`.
pub fn shifted_qr_iteration<S: ShiftStrategy + ?Sized>(
    matrix: &MatrixRef,
    iteration_bound: usize,
    sensitivity: f64,
    shift: &mut S,
    mut callback: Option<&mut IterationCallback<'_>>,
) -> Result<IterationOutcome, LinalgError> {
    ensure_square(matrix)?;
    if !(sensitivity > 0.0 && sensitivity.is_finite()) {
        return Err(invalid_input(format!(
            "sensitivity must be positive and finite, got {sensitivity}"
        )));
    }

    let n = matrix.row_size();
    let mut table = Table::materialize(matrix);
    let mut iterations = 0;

    let converged = loop {
        if table.is_upper_triangular(sensitivity) {
            break true;
        }
        if iterations == iteration_bound {
            break false;
        }

        let s = shift.shift(&table);
        table = qr_step(&table, s, n)?;
        iterations += 1;
        debug!(
            "QR iteration {iterations}: shift {s:.6e}, largest subdiagonal {:.3e}",
            table.max_subdiagonal()
        );

        if let Some(ref mut cb) = callback {
            // The callback can signal for an early, graceful stop.
            if !cb(iterations, &table) {
                break table.is_upper_triangular(sensitivity);
            }
        }
    };

    if converged {
        debug!("QR iteration on a {n}x{n} matrix converged after {iterations} iterations.");
    } else {
        warn!(
            "QR iteration on a {n}x{n} matrix stopped after {iterations} iterations without \
             converging; largest subdiagonal {:.3e} is not below {sensitivity:.3e}.",
            table.max_subdiagonal()
        );
    }

    Ok(IterationOutcome {
        table,
        iterations,
        converged,
    })
}

/// One similarity transform `Q'(A - sI)Q'ᵗ + sI`.
fn qr_step(working: &Table, s: f64, n: usize) -> Result<Table, LinalgError> {
    let shifted = working.shift_diagonal(-s).into_matrix();
    let chain = reflector_chain(&shifted)?;
    let q = accumulate_reflectors(&chain, n)?.into_matrix();

    let reduced = Table::materialize(&q.compose_left(&shifted)?).into_matrix();
    let rotated = Table::materialize(&reduced.compose_left(&q.transposed())?);
    Ok(rotated.shift_diagonal(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::shift::{NoShift, WilkinsonShift};
    use crate::error::LinalgErrorKind;
    use crate::matrix::from_table;

    fn sorted(mut values: Vec<f64>) -> Vec<f64> {
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    #[test]
    fn test_symmetric_two_by_two() {
        let a = from_table(vec![vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let outcome = shifted_qr_iteration(&a, 100, 1e-10, &mut NoShift, None).unwrap();
        assert!(outcome.converged);
        let eigenvalues = sorted(outcome.table.diagonal());
        assert!((eigenvalues[0] - 1.0).abs() < 1e-9);
        assert!((eigenvalues[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_already_triangular_needs_no_iteration() {
        let a = from_table(vec![
            vec![1.0, 2.0, 3.0],
            vec![0.0, 4.0, 5.0],
            vec![0.0, 0.0, 6.0],
        ])
        .unwrap();
        let outcome = shifted_qr_iteration(&a, 0, 1e-12, &mut WilkinsonShift, None).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.table.diagonal(), vec![1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_shift_strategies_agree() {
        let a = from_table(vec![
            vec![4.0, 1.0, 0.0, 0.0],
            vec![1.0, 3.0, 1.0, 0.0],
            vec![0.0, 1.0, 2.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
        ])
        .unwrap();
        let plain = shifted_qr_iteration(&a, 1000, 1e-8, &mut NoShift, None).unwrap();
        let shifted = shifted_qr_iteration(&a, 1000, 1e-8, &mut WilkinsonShift, None).unwrap();
        assert!(plain.converged && shifted.converged);

        let expected = [0.25471875982586, 1.82271708088711, 3.17728291911289, 4.74528124017413];
        for outcome in [plain, shifted] {
            let eigenvalues = sorted(outcome.table.diagonal());
            for (actual, expected) in eigenvalues.iter().zip(expected) {
                assert!((actual - expected).abs() < 1e-9, "{eigenvalues:?}");
            }
        }
    }

    #[test]
    fn test_rotation_never_converges() {
        // Eigenvalues ±i: no real upper-triangular form exists.
        let a = from_table(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).unwrap();
        let outcome = shifted_qr_iteration(&a, 25, 1e-6, &mut WilkinsonShift, None).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 25);
    }

    #[test]
    fn test_callback_can_stop_early() {
        let a = from_table(vec![vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let mut seen = Vec::new();
        let callback: &mut IterationCallback<'_> = &mut |iteration, working| {
            seen.push((iteration, working.max_subdiagonal()));
            iteration < 3
        };
        let outcome = shifted_qr_iteration(&a, 100, 1e-14, &mut NoShift, Some(callback)).unwrap();
        assert_eq!(outcome.iterations, 3);
        assert_eq!(seen.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(seen[2].1 < seen[0].1);
    }

    #[test]
    fn test_rejects_invalid_arguments() {
        let wide = from_table(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            shifted_qr_iteration(&wide, 10, 1e-6, &mut NoShift, None)
                .unwrap_err()
                .kind(),
            LinalgErrorKind::ShapeMismatch { .. }
        ));

        let square = from_table(vec![vec![1.0]]).unwrap();
        for sensitivity in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                shifted_qr_iteration(&square, 10, sensitivity, &mut NoShift, None)
                    .unwrap_err()
                    .kind(),
                LinalgErrorKind::InputError(_)
            ));
        }
    }
}
