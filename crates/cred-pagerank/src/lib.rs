//! Cred PageRank - Scoring contribution graphs
//!
//! This crate assigns every node of a [`cred_graph::Graph`] a score by
//! running PageRank over a Markov chain derived from per-edge weights.
//!
//! # Architecture
//!
//! - `weights`: the weight function contract and the configurable weight table
//! - `markov`: converts weighted edges into a sparse, row-stochastic chain
//! - `pagerank`: async power iteration to a fixed point
//! - `pagerank_graph`: the scored, staleness-checked view over a graph
//! - `plugins`: node/edge type declarations and their default weights
//!
//! # Example
//!
//! ```no_run
//! use cred_graph::Graph;
//! use cred_pagerank::{plugins::github, PagerankGraph, PagerankOptions, Weights};
//!
//! # async fn score(graph: Graph) -> Result<(), Box<dyn std::error::Error>> {
//! let weights = Weights::from_declarations(&[github::declaration()?]);
//! let mut pg = PagerankGraph::new(graph, weights.edge_evaluator())?;
//! pg.run_pagerank(PagerankOptions::default()).await?;
//!
//! for scored in pg.top_nodes(10)? {
//!     println!("{} {:.4}", scored.node, scored.score);
//! }
//! # Ok(())
//! # }
//! ```

mod markov;
mod pagerank;
mod pagerank_graph;
pub mod plugins;
mod scores;
mod weights;

#[cfg(test)]
mod test_util;

pub use markov::{
    compute_delta, sparse_markov_chain_action, uniform_distribution, IndexedEdge, InboundRow,
    SparseMarkovChain,
};
pub use pagerank::{
    find_stationary_distribution, PagerankConvergenceReport, PagerankError, PagerankOptions,
    StationaryDistributionResult,
};
pub use pagerank_graph::{PagerankGraph, PagerankGraphError, ScoredEdge, ScoredNode};
pub use scores::{scores_by_maximum, DEFAULT_MAX_CRED};
pub use weights::{EdgeTypeWeight, EdgeWeight, Weights, WeightsError};
