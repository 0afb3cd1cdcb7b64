//! Core graph data structure.
//!
//! The Graph wraps petgraph and adds address indexes for lookups.
//! Every structural change bumps a modification counter, which lets
//! dependent views (such as a scored snapshot) detect that the graph
//! they were built from has moved on.

use crate::address::{EdgeAddress, NodeAddress};
use crate::edge::{Direction, Edge, EdgeFilter, Neighbor, NeighborsOptions};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Structural errors raised by graph mutations and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("missing src on edge {edge}: {src} is not in the graph")]
    MissingSrc { edge: EdgeAddress, src: NodeAddress },

    #[error("missing dst on edge {edge}: {dst} is not in the graph")]
    MissingDst { edge: EdgeAddress, dst: NodeAddress },

    #[error("conflicting edge for {address}: already connects {existing_src} -> {existing_dst}")]
    ConflictingEdge {
        address: EdgeAddress,
        existing_src: NodeAddress,
        existing_dst: NodeAddress,
    },

    #[error("cannot remove {node}: it is incident to {edge}")]
    NodeHasEdges { node: NodeAddress, edge: EdgeAddress },

    #[error("node {0} is not in the graph")]
    MissingNode(NodeAddress),
}

/// An append-mostly directed multigraph keyed by addresses.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// The underlying petgraph graph. Stable so removals keep indexes valid.
    graph: StableDiGraph<NodeAddress, Edge>,

    /// Maps node addresses to graph indexes, in canonical order.
    node_index: BTreeMap<NodeAddress, NodeIndex>,

    /// Maps edge addresses to graph indexes, in canonical order.
    edge_index: BTreeMap<EdgeAddress, EdgeIndex>,

    /// Incremented on every effective structural change.
    modification_count: u64,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the modification counter.
    pub fn modification_count(&self) -> u64 {
        self.modification_count
    }

    fn mark_modified(&mut self) {
        self.modification_count += 1;
    }

    /// Adds a node. Adding a node that already exists does nothing.
    pub fn add_node(&mut self, address: NodeAddress) -> &mut Self {
        if !self.node_index.contains_key(&address) {
            let index = self.graph.add_node(address.clone());
            self.node_index.insert(address, index);
            self.mark_modified();
        }
        self
    }

    /// Removes a node. The node must not have any incident edges.
    pub fn remove_node(&mut self, address: &NodeAddress) -> Result<&mut Self, GraphError> {
        let Some(&index) = self.node_index.get(address) else {
            return Ok(self);
        };
        let incident = self
            .graph
            .edges_directed(index, petgraph::Direction::Outgoing)
            .chain(self.graph.edges_directed(index, petgraph::Direction::Incoming))
            .map(|edge_ref| edge_ref.weight().address.clone())
            .min();
        if let Some(edge) = incident {
            return Err(GraphError::NodeHasEdges {
                node: address.clone(),
                edge,
            });
        }
        self.graph.remove_node(index);
        self.node_index.remove(address);
        self.mark_modified();
        Ok(self)
    }

    /// Checks whether a node is present.
    pub fn has_node(&self, address: &NodeAddress) -> bool {
        self.node_index.contains_key(address)
    }

    /// Adds an edge. Both endpoints must already be in the graph.
    ///
    /// Adding an identical edge twice is a no-op; reusing an address for
    /// different endpoints is an error.
    pub fn add_edge(&mut self, edge: Edge) -> Result<&mut Self, GraphError> {
        let src = *self
            .node_index
            .get(&edge.src)
            .ok_or_else(|| GraphError::MissingSrc {
                edge: edge.address.clone(),
                src: edge.src.clone(),
            })?;
        let dst = *self
            .node_index
            .get(&edge.dst)
            .ok_or_else(|| GraphError::MissingDst {
                edge: edge.address.clone(),
                dst: edge.dst.clone(),
            })?;

        if let Some(existing) = self.edge(&edge.address) {
            if *existing == edge {
                return Ok(self);
            }
            return Err(GraphError::ConflictingEdge {
                address: edge.address.clone(),
                existing_src: existing.src.clone(),
                existing_dst: existing.dst.clone(),
            });
        }

        let address = edge.address.clone();
        let index = self.graph.add_edge(src, dst, edge);
        self.edge_index.insert(address, index);
        self.mark_modified();
        Ok(self)
    }

    /// Removes an edge. Removing an absent edge does nothing.
    pub fn remove_edge(&mut self, address: &EdgeAddress) -> &mut Self {
        if let Some(index) = self.edge_index.remove(address) {
            self.graph.remove_edge(index);
            self.mark_modified();
        }
        self
    }

    /// Checks whether an edge is present.
    pub fn has_edge(&self, address: &EdgeAddress) -> bool {
        self.edge_index.contains_key(address)
    }

    /// Gets an edge by its address.
    pub fn edge(&self, address: &EdgeAddress) -> Option<&Edge> {
        let index = self.edge_index.get(address)?;
        self.graph.edge_weight(*index)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Iterates over nodes in address order, optionally restricted to a prefix.
    pub fn nodes<'a>(
        &'a self,
        prefix: Option<&'a NodeAddress>,
    ) -> impl Iterator<Item = &'a NodeAddress> + 'a {
        self.node_index
            .keys()
            .filter(move |address| prefix.map_or(true, |p| address.has_prefix(p)))
    }

    /// Iterates over edges in address order that pass the filter.
    pub fn edges<'a>(&'a self, filter: &'a EdgeFilter) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edge_index
            .values()
            .filter_map(move |index| self.graph.edge_weight(*index))
            .filter(move |edge| filter.matches(edge))
    }

    /// Finds the nodes adjacent to `node`, together with the connecting edges.
    ///
    /// A loop edge is reported once, even for `Direction::Any`. Results are
    /// ordered by edge address.
    pub fn neighbors(
        &self,
        node: &NodeAddress,
        options: &NeighborsOptions,
    ) -> Result<Vec<Neighbor<'_>>, GraphError> {
        let index = *self
            .node_index
            .get(node)
            .ok_or_else(|| GraphError::MissingNode(node.clone()))?;

        let outgoing = matches!(options.direction, Direction::Out | Direction::Any)
            .then(|| self.graph.edges_directed(index, petgraph::Direction::Outgoing))
            .into_iter()
            .flatten()
            .map(|edge_ref| {
                let edge = edge_ref.weight();
                Neighbor {
                    node: &edge.dst,
                    edge,
                }
            });

        let skip_loops = options.direction == Direction::Any;
        let incoming = matches!(options.direction, Direction::In | Direction::Any)
            .then(|| self.graph.edges_directed(index, petgraph::Direction::Incoming))
            .into_iter()
            .flatten()
            .map(|edge_ref| edge_ref.weight())
            .filter(|edge| !(skip_loops && edge.is_loop()))
            .map(|edge| Neighbor {
                node: &edge.src,
                edge,
            });

        let mut result: Vec<Neighbor<'_>> = outgoing
            .chain(incoming)
            .filter(|n| n.node.has_prefix(&options.node_prefix))
            .filter(|n| n.edge.address.has_prefix(&options.edge_prefix))
            .collect();
        result.sort_by(|a, b| a.edge.address.cmp(&b.edge.address));
        Ok(result)
    }

    /// Combines several graphs into a new one.
    ///
    /// Edges sharing an address must agree on their endpoints.
    pub fn merge<'a, I>(graphs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = &'a Graph>,
    {
        let graphs: Vec<&Graph> = graphs.into_iter().collect();
        let mut result = Graph::new();
        for graph in &graphs {
            for node in graph.nodes(None) {
                result.add_node(node.clone());
            }
        }
        let all = EdgeFilter::all();
        for graph in &graphs {
            for edge in graph.edges(&all) {
                result.add_edge(edge.clone())?;
            }
        }
        debug!(
            "Merged {} graphs into {} nodes, {} edges",
            graphs.len(),
            result.node_count(),
            result.edge_count()
        );
        Ok(result)
    }
}

/// Graphs are equal when they hold the same nodes and edges. The
/// modification count is history, not structure, and is ignored.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        let all = EdgeFilter::all();
        self.node_index.keys().eq(other.node_index.keys())
            && self.edges(&all).eq(other.edges(&all))
    }
}

impl Eq for Graph {}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parts: &[&str]) -> NodeAddress {
        NodeAddress::from_parts(parts.iter().copied()).unwrap()
    }

    fn edge(parts: &[&str], src: &NodeAddress, dst: &NodeAddress) -> Edge {
        Edge::new(
            EdgeAddress::from_parts(parts.iter().copied()).unwrap(),
            src.clone(),
            dst.clone(),
        )
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        graph.add_node(a.clone());
        let count = graph.modification_count();
        graph.add_node(a.clone());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.modification_count(), count);
        assert!(graph.has_node(&a));
    }

    #[test]
    fn test_modification_count_increases_on_every_mutation() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        let b = node(&["b"]);
        let e = edge(&["e"], &a, &b);

        let mut seen = vec![graph.modification_count()];
        graph.add_node(a.clone());
        seen.push(graph.modification_count());
        graph.add_node(b.clone());
        seen.push(graph.modification_count());
        graph.add_edge(e.clone()).unwrap();
        seen.push(graph.modification_count());
        graph.remove_edge(&e.address);
        seen.push(graph.modification_count());
        graph.remove_node(&a).unwrap();
        seen.push(graph.modification_count());

        assert!(seen.windows(2).all(|w| w[0] < w[1]), "{:?}", seen);
    }

    #[test]
    fn test_add_edge_requires_endpoints() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        let b = node(&["b"]);
        let e = edge(&["e"], &a, &b);

        let err = graph.add_edge(e.clone()).unwrap_err();
        assert!(matches!(err, GraphError::MissingSrc { .. }));

        graph.add_node(a.clone());
        let err = graph.add_edge(e.clone()).unwrap_err();
        assert!(matches!(err, GraphError::MissingDst { .. }));

        graph.add_node(b.clone());
        graph.add_edge(e).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_conflict() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        let b = node(&["b"]);
        graph.add_node(a.clone()).add_node(b.clone());
        graph.add_edge(edge(&["e"], &a, &b)).unwrap();

        let count = graph.modification_count();
        graph.add_edge(edge(&["e"], &a, &b)).unwrap();
        assert_eq!(graph.modification_count(), count);

        let err = graph.add_edge(edge(&["e"], &b, &a)).unwrap_err();
        assert!(matches!(err, GraphError::ConflictingEdge { .. }));
    }

    #[test]
    fn test_remove_node_with_edges_fails() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        let b = node(&["b"]);
        graph.add_node(a.clone()).add_node(b.clone());
        graph.add_edge(edge(&["e"], &a, &b)).unwrap();

        let err = graph.remove_node(&b).unwrap_err();
        assert_eq!(
            err,
            GraphError::NodeHasEdges {
                node: b.clone(),
                edge: EdgeAddress::from_parts(["e"]).unwrap(),
            }
        );
        assert!(graph.has_node(&b));
    }

    #[test]
    fn test_removing_absent_entities_is_not_a_modification() {
        let mut graph = Graph::new();
        graph.remove_node(&node(&["ghost"])).unwrap();
        graph.remove_edge(&EdgeAddress::empty());
        assert_eq!(graph.modification_count(), 0);
    }

    #[test]
    fn test_nodes_and_edges_are_sorted_and_filtered() {
        let mut graph = Graph::new();
        let b = node(&["x", "b"]);
        let a = node(&["x", "a"]);
        let y = node(&["y"]);
        graph.add_node(b.clone()).add_node(y.clone()).add_node(a.clone());
        graph.add_edge(edge(&["p", "2"], &a, &y)).unwrap();
        graph.add_edge(edge(&["p", "1"], &b, &a)).unwrap();
        graph.add_edge(edge(&["q"], &y, &b)).unwrap();

        let nodes: Vec<_> = graph.nodes(None).cloned().collect();
        assert_eq!(nodes, vec![a.clone(), b.clone(), y.clone()]);

        let x = node(&["x"]);
        let prefixed: Vec<_> = graph.nodes(Some(&x)).cloned().collect();
        assert_eq!(prefixed, vec![a.clone(), b.clone()]);

        let filter = EdgeFilter::all().with_address_prefix(EdgeAddress::from_parts(["p"]).unwrap());
        let addresses: Vec<_> = graph.edges(&filter).map(|e| e.address.clone()).collect();
        assert_eq!(
            addresses,
            vec![
                EdgeAddress::from_parts(["p", "1"]).unwrap(),
                EdgeAddress::from_parts(["p", "2"]).unwrap(),
            ]
        );

        let filter = EdgeFilter::all().with_dst_prefix(x.clone()).with_src_prefix(y.clone());
        assert_eq!(graph.edges(&filter).count(), 1);
    }

    #[test]
    fn test_neighbors_respect_direction_and_loops() {
        let mut graph = Graph::new();
        let a = node(&["a"]);
        let b = node(&["b"]);
        graph.add_node(a.clone()).add_node(b.clone());
        graph.add_edge(edge(&["ab"], &a, &b)).unwrap();
        graph.add_edge(edge(&["ba"], &b, &a)).unwrap();
        graph.add_edge(edge(&["loop"], &a, &a)).unwrap();

        let out = graph.neighbors(&a, &NeighborsOptions::new(Direction::Out)).unwrap();
        assert_eq!(out.len(), 2);

        let incoming = graph.neighbors(&a, &NeighborsOptions::new(Direction::In)).unwrap();
        assert_eq!(incoming.len(), 2);

        let any = graph.neighbors(&a, &NeighborsOptions::new(Direction::Any)).unwrap();
        let edges: Vec<_> = any.iter().map(|n| n.edge.address.parts()[0].as_str()).collect();
        assert_eq!(edges, vec!["ab", "ba", "loop"]);

        let only_b = NeighborsOptions::new(Direction::Any).with_node_prefix(b.clone());
        assert_eq!(graph.neighbors(&a, &only_b).unwrap().len(), 2);

        let err = graph
            .neighbors(&node(&["ghost"]), &NeighborsOptions::new(Direction::Any))
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingNode(_)));
    }

    #[test]
    fn test_merge_and_equality() {
        let a = node(&["a"]);
        let b = node(&["b"]);
        let c = node(&["c"]);

        let mut left = Graph::new();
        left.add_node(a.clone()).add_node(b.clone());
        left.add_edge(edge(&["ab"], &a, &b)).unwrap();

        let mut right = Graph::new();
        right.add_node(b.clone()).add_node(c.clone());
        right.add_edge(edge(&["bc"], &b, &c)).unwrap();

        let merged = Graph::merge([&left, &right]).unwrap();
        assert_eq!(merged.node_count(), 3);
        assert_eq!(merged.edge_count(), 2);

        let mut expected = Graph::new();
        expected.add_node(c.clone()).add_node(b.clone()).add_node(a.clone());
        expected.add_edge(edge(&["bc"], &b, &c)).unwrap();
        expected.add_edge(edge(&["ab"], &a, &b)).unwrap();
        assert_eq!(merged, expected);

        let mut conflicting = Graph::new();
        conflicting.add_node(a.clone()).add_node(c.clone());
        conflicting.add_edge(edge(&["ab"], &c, &a)).unwrap();
        assert!(Graph::merge([&left, &conflicting]).is_err());
    }
}
