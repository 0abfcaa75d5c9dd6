//! This module defines the core abstraction for lazily composed matrices.
//!
//! The QR engine and the eigen solver never multiply dense tables directly.
//! They work through the [`Matrix`] capability: something with two sizes that
//! can hand out any of its rows or columns as a lazy [`View`]. Everything else
//! is derived from that surface:
//!
//! - `apply(v)` is the view whose `i`-th element is `row(i) · v`.
//! - `left.compose_left(right)` is the unmaterialized product `left · right`.
//!   Its columns are `left.apply(right.column(i))` and its rows are
//!   `right.transpose().apply(left.row(i))`. There is no other multiplication
//!   kernel.
//! - `transpose()` swaps rows and columns. Transposing twice hands back the
//!   very same handle ([`Arc::ptr_eq`]), so repeated transposition never
//!   nests wrappers.
//!
//! ## Size convention
//!
//! `row_size()` is the length of a row and `col_size()` the length of a
//! column. A table with `m` rows of `n` entries therefore has `row_size() == n`
//! and `col_size() == m`, and `dim(A · B) = (row_size(B), col_size(A))`.
//!
//! ## Variants
//!
//! - [`Table`] and [`Formula`]: coordinate-backed, O(1) entries and O(1)
//!   sub-views of their rows and columns.
//! - Householder reflectors and identity embeddings, built by
//!   [`householder`] and [`embed`].
//! - Products and transposes, built by [`MatrixExt::compose_left`] and
//!   [`Matrix::transpose`].

use crate::error::{Axis, LinalgError, ensure_index, ensure_shape};
use crate::view::{View, ViewIter, ViewSource};
use std::sync::Arc;

mod coordinates;
mod factory;
mod product;

pub use coordinates::{Coordinates, Formula, Table};
pub use factory::{embed, from_fn, from_table, householder, product};
pub(crate) use product::Product;

/// A shared handle to any matrix variant.
pub type MatrixRef = Arc<dyn Matrix>;

/// The capability every matrix variant implements.
///
/// `row` and `column` are unchecked accessors: callers guarantee that the
/// index is in range. The checked surface lives on [`MatrixExt`].
pub trait Matrix: Send + Sync {
    /// The length of every row.
    fn row_size(&self) -> usize;

    /// The length of every column.
    fn col_size(&self) -> usize;

    /// Row `index`, with `index < col_size()`.
    fn row(&self, index: usize) -> View;

    /// Column `index`, with `index < row_size()`.
    fn column(&self, index: usize) -> View;

    /// The transpose. Implementations must satisfy
    /// `Arc::ptr_eq(&a.clone().transpose().transpose(), &a)`.
    fn transpose(self: Arc<Self>) -> MatrixRef;
}

/// The checked, derived operations shared by every [`MatrixRef`].
pub trait MatrixExt {
    /// Row `index`, or [`LinalgErrorKind::IndexOutOfRange`](crate::error::LinalgErrorKind).
    fn get_row(&self, index: usize) -> Result<View, LinalgError>;

    /// Column `index`, or [`LinalgErrorKind::IndexOutOfRange`](crate::error::LinalgErrorKind).
    fn get_column(&self, index: usize) -> Result<View, LinalgError>;

    /// Shorthand for `self.clone().transpose()`.
    fn transposed(&self) -> MatrixRef;

    /// The lazy matrix-vector product `self · vector`.
    ///
    /// The vector length must equal `row_size()`. A vector without a known
    /// length is traversed once to count it. Each traversal of the result costs O(row_size · col_size) plus one
    /// traversal of `vector` per output element.
    fn apply(&self, vector: &View) -> Result<View, LinalgError>;

    /// The lazy product `self · right`. Nothing is computed until a row or
    /// column of the result is traversed.
    fn compose_left(&self, right: &MatrixRef) -> Result<MatrixRef, LinalgError>;

    fn is_square(&self) -> bool;

    /// Materializes every row.
    fn to_rows(&self) -> Vec<Vec<f64>>;
}

impl MatrixExt for MatrixRef {
    fn get_row(&self, index: usize) -> Result<View, LinalgError> {
        ensure_index(Axis::Row, index, self.col_size())?;
        Ok(self.row(index))
    }

    fn get_column(&self, index: usize) -> Result<View, LinalgError> {
        ensure_index(Axis::Column, index, self.row_size())?;
        Ok(self.column(index))
    }

    fn transposed(&self) -> MatrixRef {
        Arc::clone(self).transpose()
    }

    fn apply(&self, vector: &View) -> Result<View, LinalgError> {
        let len = match vector.known_len() {
            Some(len) => len,
            None => vector.iter().count(),
        };
        ensure_shape("matrix-vector product", self.row_size(), len)?;
        Ok(apply_unchecked(self, vector.clone()))
    }

    fn compose_left(&self, right: &MatrixRef) -> Result<MatrixRef, LinalgError> {
        ensure_shape("matrix product", self.row_size(), right.col_size())?;
        Ok(Product::wrap(Arc::clone(self), Arc::clone(right)))
    }

    fn is_square(&self) -> bool {
        self.row_size() == self.col_size()
    }

    fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.col_size()).map(|i| self.row(i).to_vec()).collect()
    }
}

/// `matrix · vector` without the length check.
pub(crate) fn apply_unchecked(matrix: &MatrixRef, vector: View) -> View {
    View::new(Applied {
        matrix: Arc::clone(matrix),
        vector,
    })
}

/// Fails unless `matrix` is square.
pub(crate) fn ensure_square(matrix: &MatrixRef) -> Result<(), LinalgError> {
    ensure_shape("square matrix", matrix.col_size(), matrix.row_size())
}

/// Copies any matrix into a dense [`faer::Mat`].
pub fn to_mat(matrix: &MatrixRef) -> faer::Mat<f64> {
    Table::materialize(matrix).to_mat()
}

/// Element `i` is `row(i) · vector`, recomputed on every traversal.
struct Applied {
    matrix: MatrixRef,
    vector: View,
}

impl ViewSource for Applied {
    fn traverse(&self) -> ViewIter<'_> {
        Box::new((0..self.matrix.col_size()).map(move |i| self.matrix.row(i).dot(&self.vector)))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.matrix.col_size())
    }
}

/// Rows and columns of `inner`, swapped.
pub(crate) struct Transposed {
    inner: MatrixRef,
}

impl Transposed {
    pub(crate) fn wrap(inner: MatrixRef) -> MatrixRef {
        Arc::new(Transposed { inner })
    }
}

impl Matrix for Transposed {
    fn row_size(&self) -> usize {
        self.inner.col_size()
    }

    fn col_size(&self) -> usize {
        self.inner.row_size()
    }

    fn row(&self, index: usize) -> View {
        self.inner.column(index)
    }

    fn column(&self, index: usize) -> View {
        self.inner.row(index)
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        Arc::clone(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinalgErrorKind;

    fn three_by_two() -> MatrixRef {
        from_table(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    fn two_by_five() -> MatrixRef {
        from_table(vec![
            vec![0.0, 1.0, 0.0, 3.0, 1.0],
            vec![1.0, 2.0, 4.0, -5.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_table_rows_and_columns() {
        let matrix = three_by_two();
        assert_eq!(matrix.row_size(), 2);
        assert_eq!(matrix.col_size(), 3);
        assert_eq!(matrix.get_row(0).unwrap().to_vec(), vec![1.0, 2.0]);
        assert_eq!(matrix.get_row(2).unwrap().to_vec(), vec![5.0, 6.0]);
        assert_eq!(matrix.get_column(0).unwrap().to_vec(), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_checked_accessors_reject_out_of_range() {
        let matrix = three_by_two();
        assert!(matrix.get_row(3).is_err());
        assert!(matrix.get_column(2).is_err());
    }

    #[test]
    fn test_apply() {
        let matrix = three_by_two();
        let result = matrix.apply(&View::from_vec(vec![1.0, -1.0])).unwrap();
        assert_eq!(result.to_vec(), vec![-1.0, -1.0, -1.0]);
        assert!(matrix.apply(&View::from_vec(vec![1.0; 3])).is_err());
    }

    #[test]
    fn test_apply_counts_lazy_vectors() {
        let matrix = three_by_two();
        let short = View::from_traversal(|| std::iter::once(1.0));
        let error = matrix.apply(&short).unwrap_err();
        assert!(matches!(
            error.kind(),
            LinalgErrorKind::ShapeMismatch { expected: 2, actual: 1, .. }
        ));

        let exact = View::from_traversal(|| [1.0, -1.0].into_iter());
        let result = matrix.apply(&exact).unwrap();
        assert_eq!(result.to_vec(), vec![-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_product_rows_and_columns() {
        let a = three_by_two();
        let b = two_by_five();
        let ab = a.compose_left(&b).unwrap();

        assert_eq!(ab.row_size(), 5);
        assert_eq!(ab.col_size(), 3);
        assert_eq!(ab.row(0).to_vec(), vec![2.0, 5.0, 8.0, -7.0, 1.0]);
        assert_eq!(ab.column(1).to_vec(), vec![5.0, 11.0, 17.0]);
        assert!(b.compose_left(&b).is_err());
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let a = three_by_two();
        assert!(Arc::ptr_eq(&a.transposed().transposed(), &a));

        let mut ab = a.compose_left(&two_by_five()).unwrap();
        let original = Arc::clone(&ab);
        assert_eq!(ab.transposed().row_size(), 3);
        assert_eq!(ab.transposed().col_size(), 5);

        for _ in 0..(1 << 16) {
            ab = ab.transposed().transposed();
        }
        assert!(Arc::ptr_eq(&ab, &original));
        assert_eq!(ab.column(1).to_vec(), vec![5.0, 11.0, 17.0]);
    }

    #[test]
    fn test_transposed_views() {
        let t = three_by_two().transposed();
        assert_eq!(t.row(1).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(t.column(2).to_vec(), vec![5.0, 6.0]);
        assert_eq!(t.row(1).sub_view(1, 2).to_vec(), vec![4.0, 6.0]);
    }

    #[test]
    fn test_to_mat() {
        let m = to_mat(&three_by_two());
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.ncols(), 2);
        assert_eq!(m[(2, 1)], 6.0);
    }
}
