//! The unmaterialized product of two matrices.

use super::{Matrix, MatrixRef, Transposed, apply_unchecked};
use crate::view::View;
use std::sync::Arc;

/// `left · right`, evaluated one row or column at a time.
///
/// A product owns no data. Chaining products without a cache makes every
/// traversal re-derive each factor from scratch, so long chains should put a
/// column cache between factors (see the QR engine).
pub(crate) struct Product {
    left: MatrixRef,
    right: MatrixRef,
}

impl Product {
    /// Callers have already checked `left.row_size() == right.col_size()`.
    pub(crate) fn wrap(left: MatrixRef, right: MatrixRef) -> MatrixRef {
        debug_assert_eq!(left.row_size(), right.col_size());
        Arc::new(Product { left, right })
    }
}

impl Matrix for Product {
    fn row_size(&self) -> usize {
        self.right.row_size()
    }

    fn col_size(&self) -> usize {
        self.left.col_size()
    }

    /// `row(A · B, i) = Bᵗ · row(A, i)`.
    fn row(&self, index: usize) -> View {
        apply_unchecked(
            &Arc::clone(&self.right).transpose(),
            self.left.row(index),
        )
    }

    /// `col(A · B, i) = A · col(B, i)`.
    fn column(&self, index: usize) -> View {
        apply_unchecked(&self.left, self.right.column(index))
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        Transposed::wrap(self)
    }
}
