//! Power iteration over a sparse Markov chain.
//!
//! The loop repeatedly applies the chain to a distribution until successive
//! distributions differ by at most the convergence threshold (sup norm), or
//! until the iteration budget runs out. It yields to the async runtime at
//! every iteration boundary so long computations do not starve other tasks.
//! Iterations are strictly sequential; there is no parallelism to exploit.

use crate::markov::{compute_delta, SparseMarkovChain};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PagerankError {
    #[error("initial distribution has {actual} entries but the chain has {expected} nodes")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Limits for a PageRank run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagerankOptions {
    /// Upper bound on the number of iterations.
    pub max_iterations: usize,

    /// Stop once no node's score moves by more than this.
    pub convergence_threshold: f64,
}

impl Default for PagerankOptions {
    fn default() -> Self {
        Self {
            max_iterations: 255,
            convergence_threshold: 1e-7,
        }
    }
}

/// Outcome of a PageRank run.
///
/// `convergence_delta` is `NaN` when no iteration was performed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerankConvergenceReport {
    pub n_iterations: usize,
    pub convergence_delta: f64,
}

impl PagerankConvergenceReport {
    fn not_run() -> Self {
        Self {
            n_iterations: 0,
            convergence_delta: f64::NAN,
        }
    }
}

/// Final distribution together with how it was reached.
#[derive(Debug, Clone)]
pub struct StationaryDistributionResult {
    pub pi: Vec<f64>,
    pub report: PagerankConvergenceReport,
}

/// Runs power iteration from `initial`.
///
/// Fails with `LengthMismatch` unless `initial` has one entry per node of
/// `chain`.
pub async fn find_stationary_distribution(
    chain: &SparseMarkovChain,
    initial: Vec<f64>,
    options: &PagerankOptions,
) -> Result<StationaryDistributionResult, PagerankError> {
    if initial.len() != chain.len() {
        return Err(PagerankError::LengthMismatch {
            expected: chain.len(),
            actual: initial.len(),
        });
    }

    let mut pi = initial;
    let mut report = PagerankConvergenceReport::not_run();

    if chain.is_empty() {
        debug!("Empty chain, nothing to iterate");
        return Ok(StationaryDistributionResult { pi, report });
    }

    while report.n_iterations < options.max_iterations {
        let next = chain.step(&pi);
        report.convergence_delta = compute_delta(&pi, &next);
        pi = next;
        report.n_iterations += 1;
        trace!(
            "Iteration {}: delta {:e}",
            report.n_iterations,
            report.convergence_delta
        );

        if report.convergence_delta <= options.convergence_threshold {
            break;
        }
        tokio::task::yield_now().await;
    }

    debug!(
        "Power iteration stopped after {} iterations (delta {:e})",
        report.n_iterations, report.convergence_delta
    );
    Ok(StationaryDistributionResult { pi, report })
}
