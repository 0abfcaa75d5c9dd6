//! Shift strategies for the QR iteration.
//!
//! Before each QR step the solver asks a [`ShiftStrategy`] for a scalar `s`,
//! factors `A - s I` instead of `A`, and adds `s I` back afterwards. A good
//! shift close to an eigenvalue makes the trailing subdiagonal entries vanish
//! much faster than the unshifted iteration does.
//!
//! Any closure `FnMut(&Table) -> f64` is a strategy.

use crate::matrix::{Coordinates, Matrix, Table};
use rand::Rng;

/// Chooses the shift for the next QR step from the current working matrix.
pub trait ShiftStrategy {
    fn shift(&mut self, working: &Table) -> f64;
}

impl<F: FnMut(&Table) -> f64> ShiftStrategy for F {
    fn shift(&mut self, working: &Table) -> f64 {
        self(working)
    }
}

/// The plain, unshifted QR iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShift;

impl ShiftStrategy for NoShift {
    fn shift(&mut self, _working: &Table) -> f64 {
        0.0
    }
}

/// The Wilkinson shift: the eigenvalue of the trailing `2 × 2` block closest
/// to its last diagonal entry.
///
/// With `a` and `c` the last two diagonal entries, `b` the mean of the two
/// trailing off-diagonal entries and `d = (a - c) / 2`, the shift is
///
/// ```text
/// c - sign(d) b² / (|d| + √(d² + b²))
/// ```
///
/// where `sign(0) = 1`. When the denominator vanishes the shift is `c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WilkinsonShift;

impl WilkinsonShift {
    pub fn of(working: &Table) -> f64 {
        let n = working.row_size();
        match n {
            0 => return 0.0,
            1 => return working.entry(0, 0),
            _ => {}
        }
        let a = working.entry(n - 2, n - 2);
        let c = working.entry(n - 1, n - 1);
        let b = trailing_coupling(working);
        let d = (a - c) / 2.0;

        let denominator = d.abs() + d.hypot(b);
        if denominator == 0.0 {
            return c;
        }
        c - d.signum() * b * b / denominator
    }
}

impl ShiftStrategy for WilkinsonShift {
    fn shift(&mut self, working: &Table) -> f64 {
        WilkinsonShift::of(working)
    }
}

/// Adds uniform noise to another strategy.
///
/// The noise is drawn from `[-r, r]` with `r = amplitude · |b|`, `b` being the
/// mean trailing off-diagonal entry, so it fades out as the iteration
/// converges. Perturbing the shift breaks the stalemate of exactly symmetric
/// configurations, for example a trailing block with eigenvalues `±λ`.
#[derive(Debug, Clone)]
pub struct Perturbed<S, R> {
    inner: S,
    rng: R,
    amplitude: f64,
}

impl<S: ShiftStrategy, R: Rng> Perturbed<S, R> {
    pub fn new(inner: S, rng: R, amplitude: f64) -> Self {
        Self {
            inner,
            rng,
            amplitude,
        }
    }
}

impl<S: ShiftStrategy, R: Rng> ShiftStrategy for Perturbed<S, R> {
    fn shift(&mut self, working: &Table) -> f64 {
        let base = self.inner.shift(working);
        let radius = self.amplitude * trailing_coupling(working).abs();
        if radius > 0.0 && radius.is_finite() {
            base + self.rng.random_range(-radius..=radius)
        } else {
            base
        }
    }
}

/// Mean of the two entries coupling the last two rows and columns.
fn trailing_coupling(working: &Table) -> f64 {
    let n = working.row_size();
    if n < 2 {
        return 0.0;
    }
    (working.entry(n - 2, n - 1) + working.entry(n - 1, n - 2)) / 2.0
}
