//! Node store effect interface
//!
//! The system of record for the forest. Arbor only reads the full layout,
//! looks up single nodes and writes back corrected coordinates; everything
//! else about persistence belongs to the store.

use crate::types::{NodeId, TreeNode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Node store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StoreError {
    /// A referenced node does not exist
    #[error("Node {0} does not exist")]
    NotFound(NodeId),

    /// The forest changed between reading and writing a structural mutation
    #[error("Stale snapshot while mutating node {node}: forest changed concurrently")]
    StaleSnapshot {
        /// Node being mutated
        node: NodeId,
    },

    /// A move would place a node inside its own subtree
    #[error("Cannot move node {node} into its own descendant {target}")]
    DescendantCycle {
        /// Node being moved
        node: NodeId,
        /// Requested new parent
        target: NodeId,
    },

    /// Backend failure (I/O, decoding, connection)
    #[error("Store backend failed: {reason}")]
    Backend {
        /// Failure description
        reason: String,
    },
}

impl StoreError {
    /// Create a backend error
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Read/persist access to the forest.
#[async_trait]
pub trait NodeStoreEffects: Send + Sync {
    /// All nodes ordered by `(tree_id, lft)`.
    async fn list_nodes_ordered(&self) -> Result<Vec<TreeNode>, StoreError>;

    /// Look up a single node.
    async fn get_node(&self, id: NodeId) -> Result<Option<TreeNode>, StoreError>;

    /// Persist every given node as one atomic unit: either all records are
    /// written or none are.
    async fn persist_atomic(&self, nodes: &[TreeNode]) -> Result<(), StoreError>;
}

/// Native structural mutation primitives of the store.
///
/// These are not safe under concurrent structural writers; callers are
/// expected to wrap them in the tree mutex.
#[async_trait]
pub trait TreeMutationEffects: NodeStoreEffects {
    /// Make `node` the last child of `target`, or a new root when `target`
    /// is `None`. Descendants move with it.
    async fn move_node(&self, node: NodeId, target: Option<NodeId>) -> Result<(), StoreError>;
}

/// Blanket implementation for Arc<T> where T: NodeStoreEffects
#[async_trait]
impl<T: NodeStoreEffects + ?Sized> NodeStoreEffects for std::sync::Arc<T> {
    async fn list_nodes_ordered(&self) -> Result<Vec<TreeNode>, StoreError> {
        (**self).list_nodes_ordered().await
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<TreeNode>, StoreError> {
        (**self).get_node(id).await
    }

    async fn persist_atomic(&self, nodes: &[TreeNode]) -> Result<(), StoreError> {
        (**self).persist_atomic(nodes).await
    }
}

/// Blanket implementation for Arc<T> where T: TreeMutationEffects
#[async_trait]
impl<T: TreeMutationEffects + ?Sized> TreeMutationEffects for std::sync::Arc<T> {
    async fn move_node(&self, node: NodeId, target: Option<NodeId>) -> Result<(), StoreError> {
        (**self).move_node(node, target).await
    }
}
