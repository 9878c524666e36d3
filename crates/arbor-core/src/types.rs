//! Nested-set node model
//!
//! A forest of content nodes is encoded with per-node `(lft, rgt)` intervals,
//! a `depth` and a `tree_id`. Only `id` and `parent_id` are authoritative;
//! the remaining fields are derived and may be corrupt until repaired.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identity assigned by the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Wrap a raw store id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw store id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// One entry in the forest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode {
    /// Unique identity, never recomputed
    pub id: NodeId,
    /// Parent reference; `None` marks a root
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Left interval bound
    pub lft: i64,
    /// Right interval bound
    pub rgt: i64,
    /// Depth, 1 for roots
    pub depth: u32,
    /// Identifier of the tree this node belongs to
    pub tree_id: u64,
}

impl TreeNode {
    /// A root with a fresh single-node encoding.
    pub fn root(id: NodeId, tree_id: u64) -> Self {
        Self {
            id,
            parent_id: None,
            lft: 1,
            rgt: 2,
            depth: 1,
            tree_id,
        }
    }

    /// A node with explicit coordinates, as it might be read back from storage.
    pub fn with_coordinates(
        id: NodeId,
        parent_id: Option<NodeId>,
        lft: i64,
        rgt: i64,
        depth: u32,
        tree_id: u64,
    ) -> Self {
        Self {
            id,
            parent_id,
            lft,
            rgt,
            depth,
            tree_id,
        }
    }

    /// Whether this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `other`'s interval lies strictly inside this node's interval
    /// within the same tree.
    pub fn encloses(&self, other: &TreeNode) -> bool {
        self.tree_id == other.tree_id && self.lft < other.lft && other.rgt < self.rgt
    }

    /// Number of descendants implied by the interval width.
    pub fn descendant_count(&self) -> i64 {
        ((self.rgt - self.lft - 1) / 2).max(0)
    }
}

/// Sort nodes the way the store lists them: by `(tree_id, lft)`, ties by id.
pub fn sort_by_layout(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| (a.tree_id, a.lft, a.id).cmp(&(b.tree_id, b.lft, b.id)));
}
