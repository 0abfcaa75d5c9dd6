//! Lazy matrix algebra, Householder QR and shifted QR eigenvalue iteration.
//!
//! This crate computes orthogonal factorizations and real eigenvalues of small
//! dense matrices without materializing the intermediate products those
//! algorithms are written in terms of. Matrices are handles to a capability
//! ([`matrix::Matrix`]) that hands out rows and columns as lazy, restartable
//! sequences ([`view::View`]). Products, transposes, Householder reflectors and
//! identity embeddings are all such handles, and nothing is evaluated until a
//! row or column is traversed.
//!
//! ## Algorithms
//!
//! **Householder QR** ([`solvers::qr_decompose`]): builds the chain of
//! reflectors `H_0, …, H_{n-2}` that triangularizes a square matrix `A`.
//! `Q = (H_{n-2} ⋯ H_0)ᵗ` is materialized once, and `R = Qᵗ A` stays lazy.
//!
//! **Shifted QR iteration** ([`solve`]): repeatedly replaces the working
//! matrix `A` by `Q'(A - sI)Q'ᵗ + sI` until every entry below the diagonal is
//! negligible, then reads the eigenvalues off the diagonal. The shift `s` is
//! chosen by a pluggable [`algorithms::shift::ShiftStrategy`]; the Wilkinson
//! shift is the reference choice.
//!
//! Only real eigenvalues can be extracted. A matrix with complex eigenvalues
//! keeps a `2 × 2` block on the diagonal and the iteration runs out of its
//! bound.
//!
//! ## Example Usage
//!
//! ```rust
//! use lazy_qr::algorithms::shift::WilkinsonShift;
//! use lazy_qr::matrix::{MatrixExt, from_table};
//! use lazy_qr::{qr_decompose, solve};
//!
//! let a = from_table(vec![
//!     vec![12.0, -51.0, 4.0],
//!     vec![6.0, 167.0, -68.0],
//!     vec![-4.0, 24.0, -41.0],
//! ])
//! .unwrap();
//!
//! // R is upper triangular.
//! let qr = qr_decompose(&a).unwrap();
//! let r = qr.r.to_rows();
//! assert!((r[0][0] - 14.0).abs() < 1e-9);
//! assert!(r[2][0].abs() < 1e-9);
//!
//! // Eigenvalues, sorted by decreasing magnitude.
//! let mut eigenvalues = [0.0; 3];
//! let remaining = solve(&a, 50, 1e-4, &mut WilkinsonShift, &mut eigenvalues).unwrap();
//! assert!(remaining > 0);
//! assert!((eigenvalues[0] - 156.1367).abs() < 1e-3);
//! ```

// Declare the modules that form the crate's API structure.
pub mod algorithms;
pub mod error;
pub mod matrix;
pub mod solvers;
pub mod utils;
pub mod view;

// Re-export the main API from solvers for convenient access.
// These are the primary functions that users should use.
pub use algorithms::qr::{QrDecomposition, orthogonal_factor, reflector_chain};
pub use solvers::{SolveReport, SolverConfig, eigenvalues, eigenvalues_with, qr_decompose, solve};
