//! Presentation scaling for scores.
//!
//! Raw PageRank scores are probabilities and get tiny on large graphs.
//! For display, cred is the score rescaled so the top node has a fixed
//! value (1000 by convention).

/// Conventional cred of the highest-scoring node.
pub const DEFAULT_MAX_CRED: f64 = 1000.0;

/// Rescales `scores` so the largest becomes `max`.
///
/// If no score is positive the input is returned unchanged.
pub fn scores_by_maximum(scores: &[f64], max: f64) -> Vec<f64> {
    let top = scores.iter().copied().fold(0.0, f64::max);
    if top <= 0.0 {
        return scores.to_vec();
    }
    scores.iter().map(|score| score * max / top).collect()
}
