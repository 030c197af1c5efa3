//! Node identity for configuration distribution.
//!
//! This module provides [`Node`], the opaque descriptor a data-plane proxy
//! presents on its first request, and [`NodeHash`], the caller-supplied
//! mapping from a descriptor to the stable string key the cache indexes by.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

/// Opaque descriptor of a data-plane node.
///
/// The cache never interprets the descriptor beyond hashing it; it is kept
/// verbatim for introspection of per-node status.
///
/// # Example
///
/// ```rust
/// use convoy_core::Node;
///
/// let node = Node::new("edge-proxy-1")
///     .with_cluster("edge")
///     .with_metadata("zone", "us-east-1a");
/// assert_eq!(node.id, "edge-proxy-1");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Node {
    /// Stable identifier chosen by the node itself.
    pub id: String,
    /// Logical service cluster the node belongs to.
    pub cluster: String,
    /// Where the node runs, if it reported one.
    pub locality: Option<Locality>,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Physical location of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Locality {
    /// Region, e.g. a cloud provider region.
    pub region: String,
    /// Zone within the region.
    pub zone: String,
}

impl Node {
    /// Create a node descriptor with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the service cluster.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Set the locality.
    #[must_use]
    pub fn with_locality(mut self, locality: Locality) -> Self {
        self.locality = Some(locality);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Mapping from a node descriptor to the stable key the cache indexes by.
///
/// The same hasher must be shared by producers keying `set_snapshot` and by
/// the cache resolving watch and fetch requests, or the two sides will not
/// converge on the same entries.
pub trait NodeHash: Send + Sync + fmt::Debug {
    /// Collapse a node descriptor to its cache key.
    fn id(&self, node: &Node) -> String;
}

/// The default hasher: the node's self-reported identifier, verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdHash;

impl NodeHash for IdHash {
    fn id(&self, node: &Node) -> String {
        node.id.clone()
    }
}

/// FNV-1a hash over the whole descriptor, rendered as fixed-width hex.
///
/// Use this when node identifiers are long or attacker-chosen and a compact,
/// uniform key space is preferable to raw identifiers.
///
/// # Example
///
/// ```rust
/// use convoy_core::{FnvNodeHash, Node, NodeHash};
///
/// let key = FnvNodeHash.id(&Node::new("edge-proxy-1"));
/// assert_eq!(key.len(), 16); // 16 hex chars
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FnvNodeHash;

impl NodeHash for FnvNodeHash {
    fn id(&self, node: &Node) -> String {
        let mut hasher = FnvHasher::default();
        node.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}
