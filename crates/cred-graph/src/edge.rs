//! Edges of the contribution graph.
//!
//! An edge is a directed relationship between two nodes. Edges are
//! addressed independently of their endpoints, so the graph is a
//! multigraph: several edges may connect the same pair of nodes.

use crate::address::{EdgeAddress, NodeAddress};
use serde::{Deserialize, Serialize};

/// A directed, addressed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// The edge's identity.
    pub address: EdgeAddress,

    /// Node the edge points away from.
    pub src: NodeAddress,

    /// Node the edge points toward.
    pub dst: NodeAddress,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(address: EdgeAddress, src: NodeAddress, dst: NodeAddress) -> Self {
        Self { address, src, dst }
    }

    /// True if src and dst are the same node.
    pub fn is_loop(&self) -> bool {
        self.src == self.dst
    }
}

/// Which incident edges of a node to consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges whose dst is the node.
    In,

    /// Edges whose src is the node.
    Out,

    /// Edges in either direction.
    Any,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Any => "any",
        };
        write!(f, "{}", s)
    }
}

/// Filter applied by [`Graph::edges`](crate::Graph::edges).
///
/// Each prefix defaults to the empty address, which matches everything.
#[derive(Debug, Clone, Default)]
pub struct EdgeFilter {
    pub address_prefix: EdgeAddress,
    pub src_prefix: NodeAddress,
    pub dst_prefix: NodeAddress,
}

impl EdgeFilter {
    /// A filter that matches every edge.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_address_prefix(mut self, prefix: EdgeAddress) -> Self {
        self.address_prefix = prefix;
        self
    }

    pub fn with_src_prefix(mut self, prefix: NodeAddress) -> Self {
        self.src_prefix = prefix;
        self
    }

    pub fn with_dst_prefix(mut self, prefix: NodeAddress) -> Self {
        self.dst_prefix = prefix;
        self
    }

    /// True if the edge passes all three prefixes.
    pub fn matches(&self, edge: &Edge) -> bool {
        edge.address.has_prefix(&self.address_prefix)
            && edge.src.has_prefix(&self.src_prefix)
            && edge.dst.has_prefix(&self.dst_prefix)
    }
}

/// Options for [`Graph::neighbors`](crate::Graph::neighbors).
#[derive(Debug, Clone)]
pub struct NeighborsOptions {
    pub direction: Direction,
    pub node_prefix: NodeAddress,
    pub edge_prefix: EdgeAddress,
}

impl NeighborsOptions {
    /// Every neighbor in the given direction.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            node_prefix: NodeAddress::empty(),
            edge_prefix: EdgeAddress::empty(),
        }
    }

    pub fn with_node_prefix(mut self, prefix: NodeAddress) -> Self {
        self.node_prefix = prefix;
        self
    }

    pub fn with_edge_prefix(mut self, prefix: EdgeAddress) -> Self {
        self.edge_prefix = prefix;
        self
    }
}

/// A node adjacent to the queried node, and the edge that connects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor<'a> {
    pub node: &'a NodeAddress,
    pub edge: &'a Edge,
}
