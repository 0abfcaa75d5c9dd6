//! This module defines the custom error types for the library.
//!
//! Every precondition the matrix surface, the QR engine and the eigen solver
//! check is reported through a single enum, [`LinalgErrorKind`], wrapped in the
//! public [`LinalgError`].
//!
//! Two conditions are deliberately absent from the taxonomy. A reflector whose
//! normalizing factor is not finite degrades to the identity and the QR step
//! carries on. An eigen iteration that exhausts its bound is reported through a
//! negative remaining budget, and the caller decides whether that is a failure.
use thiserror::Error;

/// Represents all possible errors raised by the matrix and solver API.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct LinalgError(#[from] LinalgErrorKind);

impl LinalgError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> &LinalgErrorKind {
        &self.0
    }
}

/// Which axis of a matrix an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// The distinct kinds of errors.
#[derive(Error, Debug, PartialEq)]
pub enum LinalgErrorKind {
    /// Two sizes that must agree do not: a non-square matrix where a square one
    /// is required, a vector whose length differs from the row size, an output
    /// buffer of the wrong length, a ragged table, or a block too large to embed.
    #[error("Shape mismatch in {what}: expected {expected}, found {actual}.")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A row or column index outside `[0, size)`.
    #[error("Index out of range: {axis} {index} is not below {size}.")]
    IndexOutOfRange { axis: Axis, index: usize, size: usize },

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),
}

impl PartialEq for LinalgError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// Fails with [`LinalgErrorKind::ShapeMismatch`] unless `expected == actual`.
pub(crate) fn ensure_shape(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), LinalgError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LinalgErrorKind::ShapeMismatch {
            what,
            expected,
            actual,
        }
        .into())
    }
}

/// Builds a [`LinalgErrorKind::InputError`].
pub(crate) fn invalid_input(message: impl Into<String>) -> LinalgError {
    LinalgErrorKind::InputError(message.into()).into()
}

/// Fails with [`LinalgErrorKind::IndexOutOfRange`] unless `index < size`.
pub(crate) fn ensure_index(axis: Axis, index: usize, size: usize) -> Result<(), LinalgError> {
    if index < size {
        Ok(())
    } else {
        Err(LinalgErrorKind::IndexOutOfRange { axis, index, size }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let error = LinalgError(LinalgErrorKind::ShapeMismatch {
            what: "square matrix",
            expected: 3,
            actual: 2,
        });
        assert_eq!(
            error.to_string(),
            "Shape mismatch in square matrix: expected 3, found 2."
        );
    }

    #[test]
    fn test_index_out_of_range_message() {
        let error = LinalgError(LinalgErrorKind::IndexOutOfRange {
            axis: Axis::Column,
            index: 4,
            size: 4,
        });
        assert_eq!(
            error.to_string(),
            "Index out of range: column 4 is not below 4."
        );
    }

    #[test]
    fn test_input_error_message() {
        let error = LinalgError(LinalgErrorKind::InputError(
            "sensitivity must be positive".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Invalid input parameter: sensitivity must be positive"
        );
    }

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure_shape("output buffer", 3, 3).is_ok());
        assert_eq!(
            ensure_shape("output buffer", 3, 2).unwrap_err().kind(),
            &LinalgErrorKind::ShapeMismatch {
                what: "output buffer",
                expected: 3,
                actual: 2
            }
        );
        assert!(ensure_index(Axis::Row, 0, 1).is_ok());
        assert!(ensure_index(Axis::Row, 1, 1).is_err());
    }
}
