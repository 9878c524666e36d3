//! Maintenance errors

use arbor_core::effects::StoreError;
use arbor_core::{ArborError, NodeId};
use arbor_lock::LockError;
use arbor_tree::RepairError;
use thiserror::Error;

/// Failures of a maintenance operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaintenanceError {
    /// The requested node is not in the store
    #[error("Node {node} does not exist")]
    NodeNotFound {
        /// Requested id
        node: NodeId,
    },

    /// The forest could not be repaired
    #[error(transparent)]
    Repair(#[from] RepairError),

    /// The tree mutex could not be acquired or released
    #[error(transparent)]
    Lock(#[from] LockError),

    /// The node store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MaintenanceError> for ArborError {
    fn from(err: MaintenanceError) -> Self {
        match err {
            MaintenanceError::NodeNotFound { .. } => ArborError::not_found(err.to_string()),
            MaintenanceError::Repair(err) => err.into(),
            MaintenanceError::Lock(err) => err.into(),
            MaintenanceError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: ArborError = MaintenanceError::NodeNotFound { node: NodeId(9) }.into();
        assert!(matches!(err, ArborError::NotFound { .. }));
        assert!(err.to_string().contains("Node 9 does not exist"));
    }

    #[test]
    fn test_corrupt_tree_message_names_both_nodes() {
        let err = MaintenanceError::from(RepairError::CorruptTree {
            node: NodeId(4),
            missing_parent: NodeId(99),
        });
        let message = err.to_string();
        assert!(message.contains('4'));
        assert!(message.contains("99"));
    }
}
