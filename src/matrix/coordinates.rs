//! Coordinate-backed matrices: every entry is directly addressable.
//!
//! Rows and columns of such a matrix are lines of coordinates rather than
//! computed sequences, so building one, and slicing it, is O(1).

use super::{Matrix, MatrixRef, Transposed};
use crate::error::{Axis, LinalgError, ensure_shape, invalid_input};
use crate::view::{View, ViewIter, ViewSource};
use faer::{Mat, MatRef};
use std::{fmt, sync::Arc};

/// A matrix with O(1) access to `entry(row, col)`.
///
/// Implementors are cheap to clone: lines handed out by [`row_line`] and
/// [`column_line`] keep their own clone of the matrix.
pub trait Coordinates: Matrix + Clone + 'static {
    fn entry(&self, row: usize, col: usize) -> f64;
}

/// Row `index` of a coordinate-backed matrix.
pub(crate) fn row_line<C: Coordinates>(matrix: &C, index: usize) -> View {
    debug_assert!(index < matrix.col_size());
    View::new(Line {
        len: matrix.row_size(),
        matrix: matrix.clone(),
        axis: Axis::Row,
        index,
        skip: 0,
    })
}

/// Column `index` of a coordinate-backed matrix.
pub(crate) fn column_line<C: Coordinates>(matrix: &C, index: usize) -> View {
    debug_assert!(index < matrix.row_size());
    View::new(Line {
        len: matrix.col_size(),
        matrix: matrix.clone(),
        axis: Axis::Column,
        index,
        skip: 0,
    })
}

/// The entries `skip..skip + len` along one row or column.
struct Line<C> {
    matrix: C,
    axis: Axis,
    index: usize,
    skip: usize,
    len: usize,
}

impl<C: Coordinates> ViewSource for Line<C> {
    fn traverse(&self) -> ViewIter<'_> {
        let (matrix, axis, index) = (&self.matrix, self.axis, self.index);
        Box::new((self.skip..self.skip + self.len).map(move |k| match axis {
            Axis::Row => matrix.entry(index, k),
            Axis::Column => matrix.entry(k, index),
        }))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.len)
    }

    fn slice(&self, skip: usize, len: usize) -> Option<View> {
        let skip = skip.min(self.len);
        Some(View::new(Line {
            matrix: self.matrix.clone(),
            axis: self.axis,
            index: self.index,
            skip: self.skip + skip,
            len: len.min(self.len - skip),
        }))
    }
}

/// A dense, row-major table of entries.
///
/// Tables are immutable; operations that "modify" one return a new table.
#[derive(Clone)]
pub struct Table {
    data: Arc<[f64]>,
    row_size: usize,
    col_size: usize,
}

impl Table {
    /// Builds a table from its rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LinalgError> {
        let col_size = rows.len();
        let row_size = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(row_size * col_size);
        for row in rows {
            ensure_shape("table row", row_size, row.len())?;
            data.extend(row);
        }
        Ok(Self {
            data: data.into(),
            row_size,
            col_size,
        })
    }

    /// Builds a table from `col_size` consecutive rows of `row_size` entries.
    pub fn from_row_major(
        row_size: usize,
        col_size: usize,
        data: Vec<f64>,
    ) -> Result<Self, LinalgError> {
        let len = row_size.checked_mul(col_size).ok_or_else(|| {
            invalid_input(format!("a {col_size} x {row_size} table does not fit in memory"))
        })?;
        ensure_shape("row-major buffer", len, data.len())?;
        Ok(Self {
            data: data.into(),
            row_size,
            col_size,
        })
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self {
            data: data.into(),
            row_size: n,
            col_size: n,
        }
    }

    /// Copies a dense [`faer`] matrix.
    pub fn from_mat(mat: MatRef<'_, f64>) -> Self {
        let (nrows, ncols) = (mat.nrows(), mat.ncols());
        let data: Vec<f64> = (0..nrows)
            .flat_map(|i| (0..ncols).map(move |j| mat[(i, j)]))
            .collect();
        Self {
            data: data.into(),
            row_size: ncols,
            col_size: nrows,
        }
    }

    /// Evaluates every row of `matrix` once and stores the result.
    ///
    /// This is the only way lazy products turn back into data: each row is
    /// traversed exactly once.
    pub fn materialize(matrix: &MatrixRef) -> Self {
        let row_size = matrix.row_size();
        let col_size = matrix.col_size();
        let mut data = Vec::with_capacity(row_size * col_size);
        for i in 0..col_size {
            data.extend(matrix.row(i).iter());
        }
        debug_assert_eq!(data.len(), row_size * col_size);
        Self {
            data: data.into(),
            row_size,
            col_size,
        }
    }

    /// Copies the table into a dense [`faer::Mat`].
    pub fn to_mat(&self) -> Mat<f64> {
        Mat::from_fn(self.col_size, self.row_size, |i, j| self.entry(i, j))
    }

    /// Row `index` as a slice.
    pub fn row_slice(&self, index: usize) -> &[f64] {
        &self.data[index * self.row_size..(index + 1) * self.row_size]
    }

    /// The main diagonal.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.row_size.min(self.col_size))
            .map(|i| self.entry(i, i))
            .collect()
    }

    /// A copy with `delta` added to every diagonal entry.
    pub fn shift_diagonal(&self, delta: f64) -> Self {
        let mut data = self.data.to_vec();
        for i in 0..self.row_size.min(self.col_size) {
            data[i * self.row_size + i] += delta;
        }
        Self {
            data: data.into(),
            row_size: self.row_size,
            col_size: self.col_size,
        }
    }

    /// The largest magnitude strictly below the diagonal, `0` when there is
    /// none.
    pub fn max_subdiagonal(&self) -> f64 {
        (1..self.col_size)
            .flat_map(|i| (0..i.min(self.row_size)).map(move |j| (i, j)))
            .map(|(i, j)| self.entry(i, j).abs())
            .fold(0.0, f64::max)
    }

    /// Whether every entry strictly below the diagonal has magnitude below
    /// `sensitivity`. A `NaN` entry is never negligible.
    pub fn is_upper_triangular(&self, sensitivity: f64) -> bool {
        (1..self.col_size).all(|i| {
            (0..i.min(self.row_size)).all(|j| self.entry(i, j).abs() < sensitivity)
        })
    }

    pub fn into_matrix(self) -> MatrixRef {
        Arc::new(self)
    }
}

impl Coordinates for Table {
    #[inline]
    fn entry(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.row_size + col]
    }
}

impl Matrix for Table {
    fn row_size(&self) -> usize {
        self.row_size
    }

    fn col_size(&self) -> usize {
        self.col_size
    }

    fn row(&self, index: usize) -> View {
        row_line(self, index)
    }

    fn column(&self, index: usize) -> View {
        column_line(self, index)
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        Transposed::wrap(self)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.col_size).map(|i| self.row_slice(i)))
            .finish()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Table {
    type Error = LinalgError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Table::from_rows(rows)
    }
}

type EntryFn = dyn Fn(usize, usize) -> f64 + Send + Sync;

/// A matrix whose entries are computed by a closure on access.
#[derive(Clone)]
pub struct Formula {
    f: Arc<EntryFn>,
    row_size: usize,
    col_size: usize,
}

impl Formula {
    pub fn new(
        row_size: usize,
        col_size: usize,
        f: impl Fn(usize, usize) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            f: Arc::new(f),
            row_size,
            col_size,
        }
    }

    pub fn into_matrix(self) -> MatrixRef {
        Arc::new(self)
    }
}

impl Coordinates for Formula {
    #[inline]
    fn entry(&self, row: usize, col: usize) -> f64 {
        (self.f)(row, col)
    }
}

impl Matrix for Formula {
    fn row_size(&self) -> usize {
        self.row_size
    }

    fn col_size(&self) -> usize {
        self.col_size
    }

    fn row(&self, index: usize) -> View {
        row_line(self, index)
    }

    fn column(&self, index: usize) -> View {
        column_line(self, index)
    }

    fn transpose(self: Arc<Self>) -> MatrixRef {
        Transposed::wrap(self)
    }
}
