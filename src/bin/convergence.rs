//! Experiment Runner for the Convergence Analysis.
//!
//! For every matrix size in the requested range, this executable draws a batch of random
//! symmetric matrices from a seeded generator and solves each one with every shift strategy
//! (`none`, `wilkinson`, `perturbed`). Each run is checked against the eigenvalues computed by
//! `faer` and summarized as one CSV record: iterations used, whether the iteration converged,
//! the largest absolute eigenvalue error and the wall-clock time.
//!
//! Records are written as soon as they are produced, so partial results survive a failure
//! mid-way through the experiment.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use faer::{Mat, Side};
use lazy_qr::{
    SolveReport, SolverConfig,
    algorithms::shift::{NoShift, Perturbed, ShiftStrategy, WilkinsonShift},
    eigenvalues_with,
    matrix::{MatrixRef, Table},
    solvers::sort_by_magnitude,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Instant};

/// The shift strategy used for a run.
#[derive(ValueEnum, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy)]
#[serde(rename_all = "kebab-case")]
enum Strategy {
    None,
    Wilkinson,
    Perturbed,
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[clap(
    name = "convergence-runner",
    about = "Compares the convergence of the shift strategies on random symmetric matrices."
)]
struct ConvergenceArgs {
    /// The smallest matrix size.
    #[clap(long, default_value_t = 2)]
    size_start: usize,
    /// The largest matrix size.
    #[clap(long, default_value_t = 10)]
    size_end: usize,
    /// The number of random matrices per size.
    #[clap(long, default_value_t = 5)]
    trials: usize,
    /// The maximum number of QR iterations per run.
    #[clap(long, default_value_t = SolverConfig::default().iteration_bound)]
    iteration_bound: usize,
    /// The sub-diagonal threshold of the convergence check.
    #[clap(long, default_value_t = SolverConfig::default().sensitivity)]
    sensitivity: f64,
    /// The relative amplitude of the noise added by the `perturbed` strategy.
    #[clap(long, default_value_t = 0.1)]
    amplitude: f64,
    /// The seed of the matrix generator and of the shift noise.
    #[clap(long, default_value_t = 42)]
    seed: u64,
    /// The strategies to run. All of them by default.
    #[clap(long, value_enum, value_delimiter = ',')]
    strategies: Vec<Strategy>,
    /// Path to the output CSV file.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// Represents a single row of data in the output CSV.
#[derive(Debug, Serialize, Deserialize)]
struct ConvergenceResult {
    strategy: Strategy,
    n: usize,
    trial: usize,
    iterations: usize,
    converged: bool,
    max_abs_error: f64,
    time_s: f64,
}

/// A random symmetric matrix with entries uniform in `[-1, 1)`.
fn random_symmetric(n: usize, rng: &mut StdRng) -> Mat<f64> {
    let upper = Mat::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
    Mat::from_fn(n, n, |i, j| if i <= j { upper[(i, j)] } else { upper[(j, i)] })
}

/// Eigenvalues according to `faer`, sorted by decreasing magnitude.
fn reference_eigenvalues(mat: &Mat<f64>) -> Result<Vec<f64>> {
    let evd = mat
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| anyhow!("EVD failed: {:?}", e))?;
    let d_lambda = evd.S();
    let mut eigenvalues: Vec<f64> = (0..mat.nrows()).map(|i| d_lambda[i]).collect();
    sort_by_magnitude(&mut eigenvalues);
    Ok(eigenvalues)
}

fn solve_with(
    strategy: Strategy,
    matrix: &MatrixRef,
    config: &SolverConfig,
    args: &ConvergenceArgs,
    noise: &mut StdRng,
) -> Result<SolveReport> {
    let mut shift: Box<dyn ShiftStrategy + '_> = match strategy {
        Strategy::None => Box::new(NoShift),
        Strategy::Wilkinson => Box::new(WilkinsonShift),
        Strategy::Perturbed => Box::new(Perturbed::new(WilkinsonShift, noise, args.amplitude)),
    };
    Ok(eigenvalues_with(matrix, config, shift.as_mut())?)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = ConvergenceArgs::parse();
    let config = SolverConfig::default()
        .with_iteration_bound(args.iteration_bound)
        .with_sensitivity(args.sensitivity);
    config.validate()?;

    let strategies = if args.strategies.is_empty() {
        vec![Strategy::None, Strategy::Wilkinson, Strategy::Perturbed]
    } else {
        args.strategies.clone()
    };

    log::info!("Starting convergence experiment with {config:?}...");

    // Create the CSV writer. Opening the file here will truncate it if it exists.
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create CSV writer for {:?}", &args.output))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut noise = StdRng::seed_from_u64(args.seed.wrapping_add(1));

    for n in args.size_start..=args.size_end {
        log::info!("Processing matrix size: {n}");

        for trial in 0..args.trials {
            let mat = random_symmetric(n, &mut rng);
            let expected = reference_eigenvalues(&mat)?;
            let matrix = Table::from_mat(mat.as_ref()).into_matrix();

            for &strategy in &strategies {
                let start = Instant::now();
                let report = solve_with(strategy, &matrix, &config, &args, &mut noise)?;
                let time_s = start.elapsed().as_secs_f64();

                let max_abs_error = report
                    .eigenvalues
                    .iter()
                    .zip(&expected)
                    .map(|(a, e)| (a - e).abs())
                    .fold(0.0, f64::max);

                writer.serialize(ConvergenceResult {
                    strategy,
                    n,
                    trial,
                    iterations: report.iterations,
                    converged: report.converged,
                    max_abs_error,
                    time_s,
                })?;
            }
            writer.flush()?;
        }
    }

    log::info!("Convergence experiment complete. Results saved to {:?}", args.output);
    Ok(())
}
