//! Common utilities shared by the integration tests and the experiment binary.
//!
//! - **`data_loader`**: Parses the plain-text `.mat` regression fixtures under
//!   `fixtures/` into a [`crate::matrix::Table`] together with the solver
//!   parameters and the expected eigenvalues.

pub mod data_loader;
