//! Regression tests over the matrices stored under `fixtures/`.
//!
//! The build script generates one `#[test]` per `.mat` file. Every test loads its fixture,
//! runs the solver with the Wilkinson shift and the fixture's bound and sensitivity, and
//! compares the result with the eigenvalues listed in the file.

use anyhow::{Context, Result, ensure};
use lazy_qr::{eigenvalues, utils::data_loader::load_fixture};
use std::path::PathBuf;

/// One fixture file, as discovered by the build script.
#[derive(Debug)]
struct FixtureInstance {
    name: &'static str,
    path: PathBuf,
}

/// Loads the fixture and checks that the solver converges to the documented eigenvalues.
///
/// Listed eigenvalues may be rounded, so they are compared with a tolerance of ten times
/// the fixture's sensitivity.
fn run_regression_test_for_fixture(instance: &FixtureInstance) -> Result<()> {
    let fixture = load_fixture(&instance.path)
        .with_context(|| format!("failed to load fixture '{}'", instance.name))?;
    let matrix = fixture.table.clone().into_matrix();
    let report = eigenvalues(&matrix, &fixture.config())?;

    ensure!(
        report.converged,
        "{}: no convergence within {} iterations",
        instance.name,
        fixture.iteration_bound
    );
    ensure!(report.remaining >= 0);

    let tolerance = 10.0 * fixture.sensitivity;
    for (i, (actual, expected)) in report.eigenvalues.iter().zip(&fixture.eigenvalues).enumerate() {
        ensure!(
            (actual - expected).abs() < tolerance,
            "{}: eigenvalue {i} is {actual}, expected {expected}",
            instance.name
        );
    }
    Ok(())
}

include!(concat!(env!("OUT_DIR"), "/fixture_regression_tests.rs"));
