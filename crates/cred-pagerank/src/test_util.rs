//! Shared fixtures for tests.

use cred_graph::{Edge, EdgeAddress, Graph, NodeAddress};

pub fn node(parts: &[&str]) -> NodeAddress {
    NodeAddress::from_parts(parts.iter().copied()).unwrap()
}

pub fn edge(parts: &[&str], src: &NodeAddress, dst: &NodeAddress) -> Edge {
    Edge::new(
        EdgeAddress::from_parts(parts.iter().copied()).unwrap(),
        src.clone(),
        dst.clone(),
    )
}

/// A small graph exercising the awkward cases:
/// - two parallel edges `src -> dst` plus one edge back, forming a 2-cycle
/// - a `hub` with only outbound edges
/// - a node with a self-loop
/// - an isolated node
pub fn advanced_graph() -> Graph {
    let src = node(&["src"]);
    let dst = node(&["dst"]);
    let hub = node(&["hub"]);
    let looped = node(&["loop"]);
    let isolated = node(&["isolated"]);

    let mut graph = Graph::new();
    graph
        .add_node(src.clone())
        .add_node(dst.clone())
        .add_node(hub.clone())
        .add_node(looped.clone())
        .add_node(isolated);
    for e in [
        edge(&["hom", "1"], &src, &dst),
        edge(&["hom", "2"], &src, &dst),
        edge(&["hetero"], &dst, &src),
        edge(&["hub", "src"], &hub, &src),
        edge(&["loop", "loop"], &looped, &looped),
    ] {
        graph.add_edge(e).unwrap();
    }
    graph
}
