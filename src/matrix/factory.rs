//! Constructors for every matrix variant.
//!
//! Householder reflectors and identity embeddings are built here. Neither
//! ever allocates its full square table: reflector entries come from a
//! formula, and embeddings glue one-hot views onto slices of their block.

use super::coordinates::{Coordinates, Table, column_line, row_line};
use super::{Formula, Matrix, MatrixExt, MatrixRef, Transposed, ensure_square};
use crate::error::{LinalgError, LinalgErrorKind, invalid_input};
use crate::view::View;
use std::sync::Arc;

/// A table-backed matrix from its rows.
pub fn from_table(rows: Vec<Vec<f64>>) -> Result<MatrixRef, LinalgError> {
    Ok(Table::from_rows(rows)?.into_matrix())
}

/// A formula-backed matrix with entries `f(row, col)`.
pub fn from_fn(
    row_size: usize,
    col_size: usize,
    f: impl Fn(usize, usize) -> f64 + Send + Sync + 'static,
) -> MatrixRef {
    Formula::new(row_size, col_size, f).into_matrix()
}

/// The lazy product `left · right`.
pub fn product(left: &MatrixRef, right: &MatrixRef) -> Result<MatrixRef, LinalgError> {
    left.compose_left(right)
}

/// The reflector `H = I - 2 v vᵗ` for a unit vector `v`.
///
/// `v` is used as given; normalizing it is the caller's job. `H` is
/// symmetric, so its transpose is itself.
pub fn householder(v: &[f64]) -> Result<MatrixRef, LinalgError> {
    if v.is_empty() {
        return Err(invalid_input("a Householder vector must not be empty"));
    }
    Ok(Arc::new(Householder { v: v.into() }))
}

/// Places the square `block` as the trailing principal block of a `dim × dim`
/// matrix whose leading `dim - k` rows and columns are the identity.
pub fn embed(block: MatrixRef, dim: usize) -> Result<MatrixRef, LinalgError> {
    ensure_square(&block)?;
    if block.row_size() > dim {
        return Err(LinalgErrorKind::ShapeMismatch {
            what: "embedded block",
            expected: dim,
            actual: block.row_size(),
        }
        .into());
    }
    Ok(Arc::new(Embedded { block, dim }))
}

#[derive(Clone)]
pub(crate) struct Householder {
    v: Arc<[f64]>,
}

impl Coordinates for Householder {
    #[inline]
    fn entry(&self, row: usize, col: usize) -> f64 {
        let delta = if row == col { 1.0 } else { 0.0 };
        delta - 2.0 * self.v[row] * self.v[col]
    }
}

impl Matrix for Householder {
    fn row_size(&self) -> usize {
        self.v.len()
    }

    fn col_size(&self) -> usize {
        self.v.len()
    }

    fn row(&self, index: usize) -> View {
        row_line(self, index)
    }

    fn column(&self, index: usize) -> View {
        column_line(self, index)
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        self
    }
}

/// `diag(I_{dim-k}, block)`.
struct Embedded {
    block: MatrixRef,
    dim: usize,
}

impl Embedded {
    fn leading(&self) -> usize {
        self.dim - self.block.row_size()
    }
}

impl Matrix for Embedded {
    fn row_size(&self) -> usize {
        self.dim
    }

    fn col_size(&self) -> usize {
        self.dim
    }

    fn row(&self, index: usize) -> View {
        let leading = self.leading();
        if index < leading {
            View::one_hot(self.dim, index)
        } else {
            View::zeros(leading).then(&self.block.row(index - leading))
        }
    }

    fn column(&self, index: usize) -> View {
        let leading = self.leading();
        if index < leading {
            View::one_hot(self.dim, index)
        } else {
            View::zeros(leading).then(&self.block.column(index - leading))
        }
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        let block = Arc::clone(&self.block).transpose();
        if Arc::ptr_eq(&block, &self.block) {
            self
        } else {
            Transposed::wrap(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tolerance, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_householder_is_its_own_transpose() {
        let h = householder(&[1.0, 2.0, -1.0]).unwrap();
        assert!(Arc::ptr_eq(&h.transposed(), &h));
        assert_eq!((h.row_size(), h.col_size()), (3, 3));
        // v vᵗ has row 1 equal to [2, 4, -2].
        assert_eq!(h.row(1).to_vec(), vec![-4.0, -7.0, 4.0]);
        assert_eq!(h.column(1).to_vec(), vec![-4.0, -7.0, 4.0]);
    }

    #[test]
    fn test_householder_is_involutive() {
        let norm = (1.0f64 + 4.0 + 9.0).sqrt();
        let h = householder(&[1.0 / norm, -2.0 / norm, 3.0 / norm]).unwrap();
        let hh = Table::materialize(&h.compose_left(&h).unwrap());
        for i in 0..3 {
            let mut expected = vec![0.0; 3];
            expected[i] = 1.0;
            assert_close(hh.row_slice(i), &expected, 1e-12);
        }
    }

    #[test]
    fn test_householder_rejects_empty_vector() {
        assert!(householder(&[]).is_err());
    }

    #[test]
    fn test_embed_places_block_in_trailing_corner() {
        let block = from_table(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let e = embed(block, 4).unwrap();

        assert_eq!(e.row(0).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(e.row(1).to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(e.row(2).to_vec(), vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(e.column(3).to_vec(), vec![0.0, 0.0, 2.0, 4.0]);
        assert_eq!(e.row(3).sub_view(2, 2).to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_embed_transpose() {
        let block = from_table(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let e = embed(block, 3).unwrap();
        let t = e.transposed();
        assert_eq!(t.row(2).to_vec(), vec![0.0, 2.0, 4.0]);
        assert!(Arc::ptr_eq(&t.transposed(), &e));

        let h = embed(householder(&[0.6, 0.8]).unwrap(), 3).unwrap();
        assert!(Arc::ptr_eq(&h.transposed(), &h));
    }

    #[test]
    fn test_embed_rejects_bad_shapes() {
        let wide = from_table(vec![vec![1.0, 2.0]]).unwrap();
        let error = embed(wide, 3).err().unwrap();
        assert!(matches!(error.kind(), LinalgErrorKind::ShapeMismatch { .. }));

        let block = from_table(vec![vec![1.0; 3]; 3]).unwrap();
        let error = embed(block, 2).err().unwrap();
        assert!(matches!(
            error.kind(),
            LinalgErrorKind::ShapeMismatch { what: "embedded block", expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_from_fn_and_product() {
        let a = from_fn(2, 2, |i, j| (i * 2 + j) as f64);
        let b = from_table(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let ab = product(&a, &b).unwrap();
        assert_eq!(ab.to_rows(), vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
    }
}
