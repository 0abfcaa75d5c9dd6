//! This module provides utilities for loading regression matrices from files.
//!
//! A fixture is a plain-text `.mat` file. Header lines start with `#` and
//! carry the solver parameters and the expected eigenvalues; every other
//! non-empty line is one row of the matrix:
//!
//! ```text
//! # bound 100
//! # sensitivity 1e-6
//! # eigenvalues 3 1
//! 2 1
//! 1 2
//! ```
//!
//! Header lines with an unknown key are comments.

use crate::error::LinalgError;
use crate::matrix::{Matrix, Table};
use crate::solvers::SolverConfig;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};
use thiserror::Error;

/// Represents all possible errors that can occur during fixture loading and parsing.
#[derive(Error, Debug)]
pub enum DataLoaderError {
    /// Wraps a standard I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Occurs when a string cannot be parsed into an integer.
    #[error("Parse error: Failed to parse integer from '{0}'")]
    ParseInt(String),
    /// Occurs when a string cannot be parsed into a float.
    #[error("Parse error: Failed to parse float from '{0}'")]
    ParseFloat(String),
    /// Occurs when a required header line is absent.
    #[error("Format error: The '# {0}' header line was not found.")]
    HeaderMissing(&'static str),
    /// Occurs when the rows do not form a valid table.
    #[error("Format error: {0}")]
    Table(#[from] LinalgError),
    /// Occurs if the number of expected eigenvalues differs from the matrix size.
    #[error("Dimension mismatch: {found} eigenvalues listed for a matrix of size {size}.")]
    EigenvalueCountMismatch { found: usize, size: usize },
}

/// A regression matrix with the parameters it is solved with.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub table: Table,
    pub iteration_bound: usize,
    pub sensitivity: f64,
    /// The expected eigenvalues, in the order the solver reports them.
    pub eigenvalues: Vec<f64>,
}

impl Fixture {
    pub fn config(&self) -> SolverConfig {
        SolverConfig::default()
            .with_iteration_bound(self.iteration_bound)
            .with_sensitivity(self.sensitivity)
    }
}

fn parse_floats<'a>(
    parts: impl Iterator<Item = &'a str>,
) -> Result<Vec<f64>, DataLoaderError> {
    parts
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| DataLoaderError::ParseFloat(part.to_string()))
        })
        .collect()
}

/// Parses a fixture from any buffered reader.
pub fn parse_fixture(reader: impl BufRead) -> Result<Fixture, DataLoaderError> {
    let mut iteration_bound = None;
    let mut sensitivity = None;
    let mut eigenvalues = None;
    let mut rows = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(header) = line.strip_prefix('#') else {
            rows.push(parse_floats(line.split_whitespace())?);
            continue;
        };

        let mut parts = header.split_whitespace();
        match parts.next() {
            Some("bound") => {
                let value = parts.next().unwrap_or_default();
                iteration_bound = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| DataLoaderError::ParseInt(value.to_string()))?,
                );
            }
            Some("sensitivity") => {
                let value = parts.next().unwrap_or_default();
                sensitivity = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| DataLoaderError::ParseFloat(value.to_string()))?,
                );
            }
            Some("eigenvalues") => eigenvalues = Some(parse_floats(parts)?),
            _ => continue, // Comment line, ignore.
        }
    }

    let table = Table::from_rows(rows)?;
    let eigenvalues = eigenvalues.ok_or(DataLoaderError::HeaderMissing("eigenvalues"))?;
    if eigenvalues.len() != table.col_size() {
        return Err(DataLoaderError::EigenvalueCountMismatch {
            found: eigenvalues.len(),
            size: table.col_size(),
        });
    }

    Ok(Fixture {
        table,
        iteration_bound: iteration_bound.ok_or(DataLoaderError::HeaderMissing("bound"))?,
        sensitivity: sensitivity.ok_or(DataLoaderError::HeaderMissing("sensitivity"))?,
        eigenvalues,
    })
}

/// Loads a fixture from a `.mat` file.
pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture, DataLoaderError> {
    let file = File::open(path)?;
    parse_fixture(BufReader::new(file))
}
