//! Edge weights and the weights configuration file.
//!
//! A weight function maps every edge to a pair of non-negative masses:
//! how strongly score flows forward along the edge (src to dst) and how
//! strongly it flows backward. Callers may supply any function; the
//! [`Weights`] table here is the configurable default, seeded from plugin
//! declarations and optionally overridden by a JSON file.

use crate::plugins::PluginDeclaration;
use cred_graph::{Edge, EdgeAddress, NodeAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Mass that an edge contributes in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeWeight {
    /// Scales probability mass flowing src -> dst.
    pub to_weight: f64,

    /// Scales probability mass flowing dst -> src.
    pub fro_weight: f64,
}

impl EdgeWeight {
    pub fn new(to_weight: f64, fro_weight: f64) -> Self {
        Self {
            to_weight,
            fro_weight,
        }
    }

    /// Both masses are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        is_valid_weight(self.to_weight) && is_valid_weight(self.fro_weight)
    }
}

fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

/// Default forward/backward weights for a family of edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeTypeWeight {
    pub forwards: f64,
    pub backwards: f64,
}

impl EdgeTypeWeight {
    pub fn new(forwards: f64, backwards: f64) -> Self {
        Self {
            forwards,
            backwards,
        }
    }
}

impl Default for EdgeTypeWeight {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Errors raised while loading or validating a weights file.
#[derive(Error, Debug)]
pub enum WeightsError {
    #[error("failed to read weights file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed weights file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid weight {weight} for node prefix {prefix}")]
    InvalidNodeWeight { prefix: NodeAddress, weight: f64 },

    #[error("invalid weights {weight:?} for edge prefix {prefix}")]
    InvalidEdgeWeight {
        prefix: EdgeAddress,
        weight: EdgeTypeWeight,
    },
}

/// Weight table keyed by address prefix.
///
/// A node's weight is the product of the weights of every registered prefix
/// it matches, and 1 when it matches none. Edge weights combine the same way,
/// independently for each direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    #[serde(with = "entries", default)]
    node_weights: BTreeMap<NodeAddress, f64>,

    #[serde(with = "entries", default)]
    edge_weights: BTreeMap<EdgeAddress, EdgeTypeWeight>,
}

impl Weights {
    /// An empty table: every node weighs 1, every edge is (1, 1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table with the default weights of each declared type.
    pub fn from_declarations(declarations: &[PluginDeclaration]) -> Self {
        let mut weights = Self::new();
        for declaration in declarations {
            for node_type in &declaration.node_types {
                weights.set_node_weight(node_type.prefix.clone(), node_type.default_weight);
            }
            for edge_type in &declaration.edge_types {
                weights.set_edge_weight(
                    edge_type.prefix.clone(),
                    EdgeTypeWeight::new(
                        edge_type.default_forward_weight,
                        edge_type.default_backward_weight,
                    ),
                );
            }
        }
        weights
    }

    pub fn set_node_weight(&mut self, prefix: NodeAddress, weight: f64) -> &mut Self {
        self.node_weights.insert(prefix, weight);
        self
    }

    pub fn set_edge_weight(&mut self, prefix: EdgeAddress, weight: EdgeTypeWeight) -> &mut Self {
        self.edge_weights.insert(prefix, weight);
        self
    }

    /// Registered node prefixes and their weights, in address order.
    pub fn node_weights(&self) -> impl Iterator<Item = (&NodeAddress, f64)> {
        self.node_weights.iter().map(|(prefix, weight)| (prefix, *weight))
    }

    /// Registered edge prefixes and their weights, in address order.
    pub fn edge_weights(&self) -> impl Iterator<Item = (&EdgeAddress, EdgeTypeWeight)> {
        self.edge_weights.iter().map(|(prefix, weight)| (prefix, *weight))
    }

    /// Replaces entries with those present in `overrides`.
    pub fn merge_overrides(&mut self, overrides: &Weights) -> &mut Self {
        for (prefix, weight) in &overrides.node_weights {
            self.node_weights.insert(prefix.clone(), *weight);
        }
        for (prefix, weight) in &overrides.edge_weights {
            self.edge_weights.insert(prefix.clone(), *weight);
        }
        self
    }

    /// Checks that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (prefix, &weight) in &self.node_weights {
            if !is_valid_weight(weight) {
                return Err(WeightsError::InvalidNodeWeight {
                    prefix: prefix.clone(),
                    weight,
                });
            }
        }
        for (prefix, &weight) in &self.edge_weights {
            if !is_valid_weight(weight.forwards) || !is_valid_weight(weight.backwards) {
                return Err(WeightsError::InvalidEdgeWeight {
                    prefix: prefix.clone(),
                    weight,
                });
            }
        }
        Ok(())
    }

    /// Reads and validates a weights file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let weights: Weights = serde_json::from_str(&text)?;
        weights.validate()?;
        debug!(
            "Loaded {} node and {} edge weights from {}",
            weights.node_weights.len(),
            weights.edge_weights.len(),
            path.display()
        );
        Ok(weights)
    }

    /// Writes the table as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightsError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Weight of a node: product over every matching prefix.
    pub fn node_weight(&self, address: &NodeAddress) -> f64 {
        self.node_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .map(|(_, weight)| *weight)
            .product()
    }

    /// Forward/backward weight of an edge: product over every matching prefix.
    pub fn edge_type_weight(&self, address: &EdgeAddress) -> EdgeTypeWeight {
        self.edge_weights
            .iter()
            .filter(|(prefix, _)| address.has_prefix(prefix))
            .fold(EdgeTypeWeight::default(), |acc, (_, weight)| {
                EdgeTypeWeight::new(acc.forwards * weight.forwards, acc.backwards * weight.backwards)
            })
    }

    /// Turns the table into a weight function.
    ///
    /// Mass flowing toward a node is scaled by that node's weight, so a
    /// heavy node attracts more score from its neighbors.
    pub fn edge_evaluator(&self) -> impl Fn(&Edge) -> EdgeWeight + '_ {
        move |edge| {
            let type_weight = self.edge_type_weight(&edge.address);
            EdgeWeight::new(
                type_weight.forwards * self.node_weight(&edge.dst),
                type_weight.backwards * self.node_weight(&edge.src),
            )
        }
    }
}

/// Serializes a map as a list of `[key, value]` pairs, since addresses are
/// arrays and cannot be JSON object keys.
mod entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(K, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
