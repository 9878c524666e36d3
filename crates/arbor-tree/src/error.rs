//! Structural errors raised before or during repair

use arbor_core::{ArborError, NodeId};
use thiserror::Error;

/// Errors that make a forest unrepairable without operator intervention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    /// A node references a parent that is not part of the forest
    #[error("Corrupt tree: node {node} references missing parent {missing_parent}")]
    CorruptTree {
        /// Node holding the dangling reference
        node: NodeId,
        /// Parent id that does not resolve
        missing_parent: NodeId,
    },

    /// Two input records share an id
    #[error("Duplicate node id {node} in forest")]
    DuplicateNode {
        /// Repeated id
        node: NodeId,
    },

    /// A node cannot reach any root by following parent pointers
    #[error("Parent cycle detected at node {node}")]
    CycleDetected {
        /// First node (in input order) on or below a cycle
        node: NodeId,
    },

    /// The forest is deeper than the configured limit
    #[error("Node {node} at depth {depth} exceeds depth limit {limit}")]
    DepthLimitExceeded {
        /// Offending node
        node: NodeId,
        /// Its derived depth
        depth: u32,
        /// Configured maximum
        limit: u32,
    },

    /// A selection names a node absent from the forest
    #[error("Node {node} is not part of the repaired forest")]
    UnknownNode {
        /// Requested id
        node: NodeId,
    },
}

impl From<RepairError> for ArborError {
    fn from(err: RepairError) -> Self {
        match err {
            RepairError::UnknownNode { .. } => ArborError::not_found(err.to_string()),
            _ => ArborError::invalid(err.to_string()),
        }
    }
}
