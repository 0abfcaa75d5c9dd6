//! Householder QR factorization over lazy matrices.
//!
//! ** NOTE: We recommend using the high-level method [`crate::solvers::qr_decompose`] instead.
//! This module is intended for use cases where the individual reflectors are needed.
//!
//! For a square matrix `A` of size `n`, step `rank` (for `rank = 0 … n-2`)
//! takes column `rank` of the partially reduced matrix, restricted to rows
//! `rank..n`, and builds the reflector `H_rank` that maps it onto a multiple of
//! the first unit vector. `H_rank` acts as the identity on the leading `rank`
//! rows and columns. After the last step,
//!
//! ```text
//! Q = (H_{n-2} ⋯ H_1 H_0)ᵗ        R = Qᵗ A
//! ```
//!
//! `R` is never stored: it is always the lazy product `Qᵗ · A`.
//!
//! ## Cost of the reflector chain
//!
//! The partially reduced matrix after step `k` is the lazy product
//! `H_k ⋯ H_0 A`. Traversing a column of such a chain naively re-traverses the
//! column of the inner factor once per output element, which is exponential in
//! the chain length. Every intermediate product is therefore wrapped in a
//! [`ColumnCache`] that keeps the most recently computed column as data, so a
//! column of the chain costs O(k n²). The caches only live inside
//! [`reflector_chain`] and are dropped with it.

use crate::error::{Axis, LinalgError, ensure_index};
use crate::matrix::{
    Matrix, MatrixExt, MatrixRef, Table, Transposed, embed, ensure_square, householder,
};
use crate::view::View;
use log::trace;
use std::sync::{Arc, Mutex, PoisonError};

/// The factors of `A = Q R`.
///
/// `q` is the materialized orthogonal factor seen through a transpose, and
/// `r` is the lazy product `qᵗ · A`.
#[derive(Clone)]
pub struct QrDecomposition {
    pub q: MatrixRef,
    pub r: MatrixRef,
}

/// Builds the reflector of step `rank` for the square matrix `working`.
///
/// The result is `dim × dim` with the identity on its leading `rank` rows and
/// columns. When the relevant column is already zero below the diagonal the
/// reflector degenerates to the identity.
pub fn householder_step(working: &MatrixRef, rank: usize) -> Result<MatrixRef, LinalgError> {
    ensure_square(working)?;
    ensure_index(Axis::Column, rank, working.row_size())?;
    step(working, rank)
}

fn step(working: &MatrixRef, rank: usize) -> Result<MatrixRef, LinalgError> {
    let dim = working.row_size();
    let mut x = working.column(rank).sub_view(rank, dim - rank).to_vec();
    match make_cancelling(&mut x) {
        Some(norm) => trace!("Householder step {rank}: reduced column norm {norm:.3e}."),
        None => trace!("Householder step {rank} is degenerate; using the identity reflector."),
    }
    embed(householder(&x)?, dim)
}

/// Turns `x` into the unit vector `v` such that `(I - 2 v vᵗ) x` is a multiple
/// of the first unit vector.
///
/// Returns the norm of the original `x`, or `None` when the normalizing factor
/// is not finite. `x` is then (numerically) zero and the reflector is the
/// identity.
fn make_cancelling(x: &mut [f64]) -> Option<f64> {
    // hypot keeps the norm exact when the squares would underflow.
    let tail = x[1..].iter().fold(0.0, |acc: f64, v| acc.hypot(*v));
    let norm = x[0].hypot(tail);
    if norm == 0.0 {
        return None;
    }
    // x[0] - sign(x[0]) * norm, with the subtraction folded into a quotient.
    // The plain difference loses half the digits once the tail is small.
    let head = tail * (tail / (x[0].abs() + norm));
    x[0] = if x[0] < 0.0 { head } else { -head };
    let scale = x[0].hypot(tail).recip();
    if !scale.is_finite() {
        return None;
    }
    for value in x.iter_mut() {
        *value *= scale;
    }
    Some(norm)
}

/// Computes the reflectors `[H_0, …, H_{n-2}]` that triangularize `m`.
///
/// A `1 × 1` (or empty) matrix is already triangular and yields an empty chain.
pub fn reflector_chain(m: &MatrixRef) -> Result<Vec<MatrixRef>, LinalgError> {
    ensure_square(m)?;
    let n = m.row_size();
    let steps = n.saturating_sub(1);
    let mut chain = Vec::with_capacity(steps);
    let mut working = Arc::clone(m);

    for rank in 0..steps {
        let reflector = step(&working, rank)?;
        // The last reflector is not needed to reduce anything further.
        if rank + 1 < steps {
            working = ColumnCache::wrap(reflector.compose_left(&working)?);
        }
        chain.push(reflector);
    }

    Ok(chain)
}

/// Multiplies `H_{k} ⋯ H_1 H_0` for `chain = [H_0, …, H_k]`, one factor at a
/// time, materializing after each factor.
///
/// An empty chain yields the `dim × dim` identity.
pub fn accumulate_reflectors(chain: &[MatrixRef], dim: usize) -> Result<Table, LinalgError> {
    let Some((first, rest)) = chain.split_first() else {
        return Ok(Table::identity(dim));
    };
    let mut accumulated = Table::materialize(first);
    for reflector in rest {
        let product = reflector.compose_left(&accumulated.into_matrix())?;
        accumulated = Table::materialize(&product);
    }
    Ok(accumulated)
}

/// The orthogonal factor `Q = (H_{n-2} ⋯ H_0)ᵗ` of `m`.
pub fn orthogonal_factor(m: &MatrixRef) -> Result<MatrixRef, LinalgError> {
    let chain = reflector_chain(m)?;
    Ok(accumulate_reflectors(&chain, m.row_size())?
        .into_matrix()
        .transpose())
}

/// Computes `Q` and the lazy `R = Qᵗ · m`.
pub fn qr(m: &MatrixRef) -> Result<QrDecomposition, LinalgError> {
    let q = orthogonal_factor(m)?;
    let r = q.transposed().compose_left(m)?;
    Ok(QrDecomposition { q, r })
}

/// Remembers the last column computed by `inner`.
///
/// Rows are not cached; they delegate to `inner`.
struct ColumnCache {
    inner: MatrixRef,
    last: Mutex<Option<(usize, Arc<[f64]>)>>,
}

impl ColumnCache {
    fn wrap(inner: MatrixRef) -> MatrixRef {
        Arc::new(ColumnCache {
            inner,
            last: Mutex::new(None),
        })
    }
}

impl Matrix for ColumnCache {
    fn row_size(&self) -> usize {
        self.inner.row_size()
    }

    fn col_size(&self) -> usize {
        self.inner.col_size()
    }

    fn row(&self, index: usize) -> View {
        self.inner.row(index)
    }

    fn column(&self, index: usize) -> View {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let data = match last.as_ref() {
            Some((cached, data)) if *cached == index => Arc::clone(data),
            _ => {
                let data: Arc<[f64]> = self.inner.column(index).to_vec().into();
                *last = Some((index, Arc::clone(&data)));
                data
            }
        };
        View::from_shared(data)
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        Transposed::wrap(self)
    }
}
