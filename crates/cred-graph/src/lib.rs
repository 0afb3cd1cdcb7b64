//! Cred Graph - Address-keyed contribution graph
//!
//! This crate holds the structural side of credrank: the hierarchical
//! addresses that identify nodes and edges across plugins, and the
//! directed multigraph that stores them.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Address-based lookups of nodes and edges
//! - Canonical (sorted) iteration order
//! - A modification counter for staleness detection
//!
//! # Example
//!
//! ```
//! use cred_graph::{Edge, EdgeAddress, Graph, NodeAddress};
//!
//! let mut graph = Graph::new();
//! let alice = NodeAddress::from_parts(["github", "user", "alice"]).unwrap();
//! let issue = NodeAddress::from_parts(["github", "issue", "1"]).unwrap();
//! graph.add_node(alice.clone()).add_node(issue.clone());
//!
//! let authors = EdgeAddress::from_parts(["github", "authors", "alice", "1"]).unwrap();
//! graph.add_edge(Edge::new(authors, alice, issue)).unwrap();
//!
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod address;
mod edge;
mod graph;

pub use address::{
    Address, AddressError, AddressKind, EdgeAddress, EdgeKind, NodeAddress, NodeKind,
};
pub use edge::{Direction, Edge, EdgeFilter, Neighbor, NeighborsOptions};
pub use graph::{Graph, GraphError};
