//! Markov chain construction.
//!
//! Turns a weighted edge list into a row-stochastic transition structure.
//! Every edge is traversable both ways: forward with mass `to_weight`,
//! backward with mass `fro_weight`. A node's outbound masses are
//! normalized by their sum, after rescaling by a power of two near the
//! largest of them so the sum stays finite even for weights close to
//! `f64::MAX`. A node with no outbound mass keeps all of its
//! probability through a synthetic self-loop, so no row is ever empty and
//! mass never leaks out of the chain.
//!
//! The chain is stored by *inbound* rows: for each target node, the source
//! nodes that feed it and the probability of each transition. That is the
//! layout power iteration wants, since each new score is a sum over
//! incoming transitions.

use crate::weights::EdgeWeight;
use std::collections::BTreeMap;

/// Transitions into a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundRow {
    /// Indexes of the source nodes.
    pub neighbors: Vec<usize>,
    /// Probability of moving from the matching neighbor into this node.
    pub weights: Vec<f64>,
}

/// A sparse Markov chain over nodes `0..len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseMarkovChain {
    rows: Vec<InboundRow>,
}

/// An edge already resolved to node indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedEdge {
    pub src: usize,
    pub dst: usize,
    pub weight: EdgeWeight,
}

impl SparseMarkovChain {
    /// Builds the chain for `node_count` nodes connected by `edges`.
    ///
    /// Edge endpoints must be valid indexes below `node_count`.
    ///
    /// Parallel edges between the same pair of nodes are coalesced into a
    /// single transition.
    pub fn build(node_count: usize, edges: &[IndexedEdge]) -> Self {
        // Largest single outbound mass of each node.
        let mut largest = vec![0.0_f64; node_count];
        for edge in edges {
            largest[edge.src] = largest[edge.src].max(edge.weight.to_weight);
            largest[edge.dst] = largest[edge.dst].max(edge.weight.fro_weight);
        }
        let scale: Vec<f64> = largest.iter().map(|&mass| power_of_two_near(mass)).collect();

        let mut out_mass = vec![0.0; node_count];
        // inbound[target][source] = rescaled mass
        let mut inbound: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); node_count];

        for edge in edges {
            let EdgeWeight {
                to_weight,
                fro_weight,
            } = edge.weight;
            if to_weight > 0.0 {
                let mass = to_weight / scale[edge.src];
                out_mass[edge.src] += mass;
                *inbound[edge.dst].entry(edge.src).or_insert(0.0) += mass;
            }
            if fro_weight > 0.0 {
                let mass = fro_weight / scale[edge.dst];
                out_mass[edge.dst] += mass;
                *inbound[edge.src].entry(edge.dst).or_insert(0.0) += mass;
            }
        }

        for (node, mass) in out_mass.iter().enumerate() {
            if *mass == 0.0 {
                inbound[node].insert(node, 1.0);
            }
        }

        let rows = inbound
            .into_iter()
            .map(|sources| {
                let mut row = InboundRow::default();
                for (source, mass) in sources {
                    let total = out_mass[source];
                    row.neighbors.push(source);
                    row.weights.push(if total == 0.0 { mass } else { mass / total });
                }
                row
            })
            .collect();

        Self { rows }
    }

    /// Number of nodes in the chain.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inbound transitions of every node, in node order.
    pub fn rows(&self) -> &[InboundRow] {
        &self.rows
    }

    /// Applies one step of the chain to a distribution.
    pub fn step(&self, pi: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| {
                row.neighbors
                    .iter()
                    .zip(&row.weights)
                    .map(|(&neighbor, &weight)| pi[neighbor] * weight)
                    .sum::<f64>()
            })
            .collect()
    }
}

/// A power of two within a factor of two of `mass`, or 1 for a zero mass.
///
/// Dividing by a power of two is exact, so rescaling leaves ordinary
/// weights' ratios untouched.
fn power_of_two_near(mass: f64) -> f64 {
    if mass <= 0.0 {
        return 1.0;
    }
    let exponent = mass.log2().floor().clamp(-1000.0, 1000.0) as i32;
    2.0_f64.powi(exponent)
}

/// One power-iteration step: `pi` multiplied by the transition matrix.
pub fn sparse_markov_chain_action(chain: &SparseMarkovChain, pi: &[f64]) -> Vec<f64> {
    chain.step(pi)
}

/// The distribution assigning `1 / n` to each of `n` nodes.
pub fn uniform_distribution(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Supremum-norm distance between two distributions.
///
/// `NaN` when there is nothing to compare, or when either side holds a `NaN`.
pub fn compute_delta(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return f64::NAN;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |acc: f64, diff| {
            if acc.is_nan() || diff.is_nan() {
                f64::NAN
            } else {
                acc.max(diff)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(src: usize, dst: usize, to: f64, fro: f64) -> IndexedEdge {
        IndexedEdge {
            src,
            dst,
            weight: EdgeWeight::new(to, fro),
        }
    }

    /// Outbound probability of each node, summed over every row.
    fn outbound_totals(chain: &SparseMarkovChain) -> Vec<f64> {
        let mut totals = vec![0.0; chain.len()];
        for row in chain.rows() {
            for (&neighbor, &weight) in row.neighbors.iter().zip(&row.weights) {
                totals[neighbor] += weight;
            }
        }
        totals
    }

    #[test]
    fn test_forward_only_edge() {
        // 0 -> 1 with no backward mass: 1 is dangling and keeps its score.
        let chain = SparseMarkovChain::build(2, &[edge(0, 1, 1.0, 0.0)]);
        assert_eq!(chain.step(&[1.0, 0.0]), vec![0.0, 1.0]);
        assert_eq!(chain.step(&[0.0, 1.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_rows_are_normalized_by_outbound_mass() {
        // 0 sends 3 to node 1 and 1 to node 2.
        let chain = SparseMarkovChain::build(
            3,
            &[edge(0, 1, 3.0, 0.0), edge(0, 2, 1.0, 0.0)],
        );
        let next = chain.step(&[1.0, 0.0, 0.0]);
        assert_eq!(next, vec![0.0, 0.75, 0.25]);
    }

    #[test]
    fn test_backward_mass_flows_dst_to_src() {
        let chain = SparseMarkovChain::build(2, &[edge(0, 1, 1.0, 1.0)]);
        assert_eq!(chain.step(&[0.0, 1.0]), vec![1.0, 0.0]);
        assert_eq!(chain.step(&[1.0, 0.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_parallel_edges_coalesce() {
        let chain = SparseMarkovChain::build(
            2,
            &[edge(0, 1, 1.0, 0.0), edge(0, 1, 1.0, 0.0), edge(1, 0, 2.0, 0.0)],
        );
        assert_eq!(chain.rows()[1].neighbors, vec![0]);
        assert_eq!(chain.rows()[1].weights, vec![1.0]);
    }

    #[test]
    fn test_loop_edge_sends_both_directions_home() {
        let chain = SparseMarkovChain::build(2, &[edge(0, 0, 1.0, 3.0), edge(0, 1, 4.0, 0.0)]);
        let next = chain.step(&[1.0, 0.0]);
        assert_eq!(next, vec![0.5, 0.5]);
    }

    #[test]
    fn test_zero_weight_node_is_dangling() {
        let chain = SparseMarkovChain::build(2, &[edge(0, 1, 0.0, 0.0)]);
        assert_eq!(chain.step(&[0.25, 0.75]), vec![0.25, 0.75]);
    }

    #[test]
    fn test_every_node_distributes_all_of_its_mass() {
        let chain = SparseMarkovChain::build(
            5,
            &[
                edge(0, 1, 1.0, 0.5),
                edge(1, 2, 2.0, 0.0),
                edge(2, 2, 1.0, 1.0),
                edge(3, 0, 0.0, 7.0),
            ],
        );
        for total in outbound_totals(&chain) {
            assert!((total - 1.0).abs() < 1e-12, "{}", total);
        }
    }

    #[test]
    fn test_action_preserves_total_mass() {
        let chain = SparseMarkovChain::build(3, &[edge(0, 1, 1.0, 1.0), edge(1, 2, 3.0, 1.0)]);
        let next = sparse_markov_chain_action(&chain, &uniform_distribution(3));
        assert_eq!(next, chain.step(&uniform_distribution(3)));
        assert!((next.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_huge_weights_still_give_stochastic_rows() {
        let chain = SparseMarkovChain::build(
            3,
            &[
                edge(0, 1, f64::MAX, 0.0),
                edge(0, 1, f64::MAX, 0.0),
                edge(0, 2, f64::MAX, f64::MAX),
                edge(1, 2, f64::MAX, 1e-300),
                edge(2, 0, 5e-324, f64::MAX),
            ],
        );
        for total in outbound_totals(&chain) {
            assert!((total - 1.0).abs() < 1e-12, "{}", total);
        }
        for row in chain.rows() {
            assert!(row.weights.iter().all(|w| w.is_finite() && *w >= 0.0));
        }

        let next = chain.step(&uniform_distribution(3));
        assert!(next.iter().all(|p| p.is_finite()));
        assert!((next.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_max_weights_split_evenly() {
        let chain = SparseMarkovChain::build(
            3,
            &[edge(0, 1, f64::MAX, 0.0), edge(0, 1, f64::MAX, 0.0), edge(0, 2, f64::MAX, 0.0)],
        );
        let next = chain.step(&[1.0, 0.0, 0.0]);
        assert!((next[1] - 2.0 / 3.0).abs() < 1e-12, "{:?}", next);
        assert!((next[2] - 1.0 / 3.0).abs() < 1e-12, "{:?}", next);
    }

    #[test]
    fn test_compute_delta_propagates_nan() {
        assert!(compute_delta(&[0.5, f64::NAN], &[0.5, 0.5]).is_nan());
        assert!(compute_delta(&[f64::NAN, 0.0], &[0.0, 1.0]).is_nan());
        assert!(compute_delta(&[0.0, 1.0], &[0.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_uniform_distribution() {
        assert!(uniform_distribution(0).is_empty());
        assert_eq!(uniform_distribution(4), vec![0.25; 4]);
    }

    #[test]
    fn test_compute_delta_uses_max_norm() {
        let delta = compute_delta(&[0.5, 0.5], &[0.2, 0.7]);
        assert!((delta - 0.3).abs() < 1e-12, "{}", delta);
        assert_eq!(compute_delta(&[0.1, 0.9], &[0.1, 0.9]), 0.0);
        assert!(compute_delta(&[], &[]).is_nan());
    }
}
