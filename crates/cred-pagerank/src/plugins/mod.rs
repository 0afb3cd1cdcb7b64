//! Plugin declarations.
//!
//! Each data source that contributes to the graph owns a node prefix and an
//! edge prefix, and declares the types of entities it creates together with
//! their default weights. The declarations seed the default [`Weights`]
//! table.
//!
//! [`Weights`]: crate::Weights

pub mod github;

use cred_graph::{EdgeAddress, NodeAddress};

/// A family of nodes sharing an address prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    pub name: String,
    pub plural_name: String,
    pub prefix: NodeAddress,
    pub default_weight: f64,
    pub description: String,
}

/// A family of edges sharing an address prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeType {
    /// Reads as "src <forward_name> dst".
    pub forward_name: String,
    /// Reads as "dst <backward_name> src".
    pub backward_name: String,
    pub prefix: EdgeAddress,
    pub default_forward_weight: f64,
    pub default_backward_weight: f64,
    pub description: String,
}

/// Everything a plugin tells the scoring layer about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDeclaration {
    pub name: String,
    pub node_prefix: NodeAddress,
    pub edge_prefix: EdgeAddress,
    pub node_types: Vec<NodeType>,
    pub edge_types: Vec<EdgeType>,
}

impl PluginDeclaration {
    /// The declared type whose prefix is the longest match for `address`.
    pub fn node_type(&self, address: &NodeAddress) -> Option<&NodeType> {
        self.node_types
            .iter()
            .filter(|t| address.has_prefix(&t.prefix))
            .max_by_key(|t| t.prefix.len())
    }

    /// The declared type whose prefix is the longest match for `address`.
    pub fn edge_type(&self, address: &EdgeAddress) -> Option<&EdgeType> {
        self.edge_types
            .iter()
            .filter(|t| address.has_prefix(&t.prefix))
            .max_by_key(|t| t.prefix.len())
    }
}
