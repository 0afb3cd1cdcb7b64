//! A graph paired with PageRank scores.
//!
//! `PagerankGraph` takes a structural snapshot of a [`Graph`] at
//! construction: the node list, the edge list, and each edge's weight as
//! produced by the caller's weight function (invoked exactly once per edge).
//! Only the score vector changes afterwards, and only through
//! [`PagerankGraph::run_pagerank`].
//!
//! The wrapped graph stays reachable through [`PagerankGraph::graph_mut`].
//! Mutating it does not refresh the snapshot; instead every accessor
//! compares the graph's modification count with the one recorded at
//! construction and fails with [`PagerankGraphError::GraphModified`] on a
//! mismatch. A stale `PagerankGraph` must be rebuilt.

use crate::markov::{uniform_distribution, IndexedEdge, SparseMarkovChain};
use crate::pagerank::{
    find_stationary_distribution, PagerankConvergenceReport, PagerankError, PagerankOptions,
};
use crate::weights::EdgeWeight;
use cred_graph::{Edge, EdgeAddress, EdgeFilter, Graph, GraphError, NodeAddress};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PagerankGraphError {
    #[error("invalid weight {weight:?} for edge {edge}")]
    InvalidWeight { edge: EdgeAddress, weight: EdgeWeight },

    #[error("underlying Graph has been modified")]
    GraphModified,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Pagerank(#[from] PagerankError),
}

/// A node and its current score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredNode<'a> {
    pub node: &'a NodeAddress,
    pub score: f64,
}

/// An edge and the weight its weight function produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEdge<'a> {
    pub edge: &'a Edge,
    pub weight: EdgeWeight,
}

#[derive(Debug, Clone)]
struct WeightedEdge {
    edge: Edge,
    weight: EdgeWeight,
}

/// Scored view over a graph snapshot.
#[derive(Debug)]
pub struct PagerankGraph {
    graph: Graph,
    observed_count: u64,

    /// Snapshot nodes in address order. Index `i` owns `scores[i]`.
    nodes: Vec<NodeAddress>,
    node_index: HashMap<NodeAddress, usize>,

    /// Snapshot edges in address order.
    edges: Vec<WeightedEdge>,
    edge_index: HashMap<EdgeAddress, usize>,

    chain: SparseMarkovChain,
    scores: Vec<f64>,
}

impl PagerankGraph {
    /// Snapshots `graph` and weighs every edge with `weight_fn`.
    ///
    /// Fails with `InvalidWeight` if any weight is negative or non-finite.
    /// Scores start out uniform.
    pub fn new<F>(graph: Graph, weight_fn: F) -> Result<Self, PagerankGraphError>
    where
        F: Fn(&Edge) -> EdgeWeight,
    {
        let observed_count = graph.modification_count();

        let nodes: Vec<NodeAddress> = graph.nodes(None).cloned().collect();
        let node_index: HashMap<NodeAddress, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.clone(), i))
            .collect();

        let all = EdgeFilter::all();
        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut indexed = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges(&all) {
            let weight = weight_fn(edge);
            if !weight.is_valid() {
                return Err(PagerankGraphError::InvalidWeight {
                    edge: edge.address.clone(),
                    weight,
                });
            }
            let src = *node_index.get(&edge.src).ok_or_else(|| GraphError::MissingSrc {
                edge: edge.address.clone(),
                src: edge.src.clone(),
            })?;
            let dst = *node_index.get(&edge.dst).ok_or_else(|| GraphError::MissingDst {
                edge: edge.address.clone(),
                dst: edge.dst.clone(),
            })?;
            indexed.push(IndexedEdge { src, dst, weight });
            edges.push(WeightedEdge {
                edge: edge.clone(),
                weight,
            });
        }
        let edge_index = edges
            .iter()
            .enumerate()
            .map(|(i, weighted)| (weighted.edge.address.clone(), i))
            .collect();

        let chain = SparseMarkovChain::build(nodes.len(), &indexed);
        let scores = uniform_distribution(nodes.len());

        debug!(
            "Built PagerankGraph over {} nodes and {} edges (modification count {})",
            nodes.len(),
            edges.len(),
            observed_count
        );

        Ok(Self {
            graph,
            observed_count,
            nodes,
            node_index,
            edges,
            edge_index,
            chain,
            scores,
        })
    }

    /// The wrapped graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the wrapped graph.
    ///
    /// Any structural change made through this handle invalidates the scores:
    /// every later accessor returns `GraphModified`.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Gives the graph back, discarding the scores.
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    fn verify_graph_not_modified(&self) -> Result<(), PagerankGraphError> {
        let current = self.graph.modification_count();
        if current != self.observed_count {
            warn!(
                "Graph modified since PagerankGraph was built (count {} -> {})",
                self.observed_count, current
            );
            return Err(PagerankGraphError::GraphModified);
        }
        Ok(())
    }

    /// Number of nodes in the snapshot.
    pub fn node_count(&self) -> Result<usize, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self.nodes.len())
    }

    /// Number of edges in the snapshot.
    pub fn edge_count(&self) -> Result<usize, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self.edges.len())
    }

    /// Looks up a node's score. `Ok(None)` if the node is not in the snapshot.
    pub fn node(&self, address: &NodeAddress) -> Result<Option<ScoredNode<'_>>, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self.node_index.get(address).map(|&i| ScoredNode {
            node: &self.nodes[i],
            score: self.scores[i],
        }))
    }

    /// Iterates over every node with its score, in address order.
    ///
    /// Each call starts a fresh iteration.
    pub fn nodes(&self) -> Result<impl Iterator<Item = ScoredNode<'_>> + '_, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self
            .nodes
            .iter()
            .zip(&self.scores)
            .map(|(node, &score)| ScoredNode { node, score }))
    }

    /// Looks up an edge's weight. `Ok(None)` if the edge is not in the snapshot.
    pub fn edge(&self, address: &EdgeAddress) -> Result<Option<ScoredEdge<'_>>, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self.edge_index.get(address).map(|&i| {
            let weighted = &self.edges[i];
            ScoredEdge {
                edge: &weighted.edge,
                weight: weighted.weight,
            }
        }))
    }

    /// Iterates over every edge with its weight, in address order.
    ///
    /// Each call starts a fresh iteration.
    pub fn edges(&self) -> Result<impl Iterator<Item = ScoredEdge<'_>> + '_, PagerankGraphError> {
        self.verify_graph_not_modified()?;
        Ok(self.edges.iter().map(|weighted| ScoredEdge {
            edge: &weighted.edge,
            weight: weighted.weight,
        }))
    }

    /// The `limit` highest-scoring nodes, best first. Ties go to the
    /// smaller address.
    pub fn top_nodes(&self, limit: usize) -> Result<Vec<ScoredNode<'_>>, PagerankGraphError> {
        let mut nodes: Vec<ScoredNode<'_>> = self.nodes()?.collect();
        nodes.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.node.cmp(b.node))
        });
        nodes.truncate(limit);
        Ok(nodes)
    }

    /// Advances the scores by power iteration, starting from the current scores.
    ///
    /// Yields to the runtime between iterations. Takes `&mut self`, so two runs
    /// on the same instance can never overlap. Scores are replaced only once
    /// the run completes; dropping the future leaves the previous scores.
    pub async fn run_pagerank(
        &mut self,
        options: PagerankOptions,
    ) -> Result<PagerankConvergenceReport, PagerankGraphError> {
        self.verify_graph_not_modified()?;

        let result =
            find_stationary_distribution(&self.chain, self.scores.clone(), &options).await?;
        self.scores = result.pi;

        info!(
            "PageRank finished: {} iterations, delta {:e} (threshold {:e}, max {})",
            result.report.n_iterations,
            result.report.convergence_delta,
            options.convergence_threshold,
            options.max_iterations
        );
        Ok(result.report)
    }
}
