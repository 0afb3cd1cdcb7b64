//! Hierarchical addresses for graph entities.
//!
//! Every node and edge in a contribution graph is keyed by an address: an
//! ordered list of string components. Plugins claim a namespace by
//! reserving a prefix (for example `["sourcecred", "github"]`) and then
//! append whatever components they need to identify their entities.
//!
//! Node and edge addresses are distinct types. Both are `Address<K>` with a
//! zero-sized kind marker, so handing an edge address to a node lookup is
//! a compile error rather than a silent miss.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use thiserror::Error;

/// Separator of the canonical serialized form. Components may not contain it.
const SEPARATOR: char = '\0';

/// Errors raised while constructing an address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("{kind} component {component:?} contains a NUL character")]
    InvalidComponent { kind: &'static str, component: String },
}

/// Marker trait distinguishing address families.
pub trait AddressKind {
    /// Human-readable family name, used in `Display` and errors.
    const NAME: &'static str;
}

/// Marker for node addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {}

/// Marker for edge addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {}

impl AddressKind for NodeKind {
    const NAME: &'static str = "NodeAddress";
}

impl AddressKind for EdgeKind {
    const NAME: &'static str = "EdgeAddress";
}

/// An ordered sequence of string components.
pub struct Address<K: AddressKind> {
    parts: Vec<String>,
    _kind: PhantomData<K>,
}

/// Address of a node.
pub type NodeAddress = Address<NodeKind>;

/// Address of an edge.
pub type EdgeAddress = Address<EdgeKind>;

impl<K: AddressKind> Address<K> {
    /// The address with zero components.
    ///
    /// It is a prefix of every address and is used as a "no such entity"
    /// sentinel.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Builds an address from its components.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::empty().append(parts)
    }

    /// Returns a new address with `parts` added after the existing components.
    pub fn append<I, S>(&self, parts: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut result = self.clone();
        for part in parts {
            let part = part.into();
            if part.contains(SEPARATOR) {
                return Err(AddressError::InvalidComponent {
                    kind: K::NAME,
                    component: part,
                });
            }
            result.parts.push(part);
        }
        Ok(result)
    }

    /// The components of this address.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True for the empty address.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True if `prefix`'s components are a leading run of this address.
    pub fn has_prefix(&self, prefix: &Self) -> bool {
        self.parts.starts_with(&prefix.parts)
    }
}

// Manual impls: derives would demand the same traits of the marker type.

impl<K: AddressKind> Clone for Address<K> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: AddressKind> PartialEq for Address<K> {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl<K: AddressKind> Eq for Address<K> {}

impl<K: AddressKind> Hash for Address<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl<K: AddressKind> PartialOrd for Address<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: AddressKind> Ord for Address<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl<K: AddressKind> Default for Address<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: AddressKind> fmt::Debug for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<K: AddressKind> fmt::Display for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", K::NAME)?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{:?}", part)?;
        }
        write!(f, "]")
    }
}

impl<K: AddressKind> Serialize for Address<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.parts.serialize(serializer)
    }
}

impl<'de, K: AddressKind> Deserialize<'de> for Address<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = Vec::<String>::deserialize(deserializer)?;
        Self::from_parts(parts).map_err(serde::de::Error::custom)
    }
}
