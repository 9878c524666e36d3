//! In-memory node store handler
//!
//! Behaves like a relational store whose structural primitives are not
//! transactional: `move_node` reads a snapshot, spends `mutation_delay`
//! computing the new layout, then writes back. A write that finds the
//! forest changed underneath it fails with `StoreError::StaleSnapshot`.

use super::{apply_records, relocate};
use arbor_core::effects::{NodeStoreEffects, StoreError, TreeMutationEffects};
use arbor_core::{NodeId, TreeNode};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    nodes: Vec<TreeNode>,
    generation: u64,
}

/// In-memory node store
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    state: RwLock<MemoryState>,
    mutation_delay: Duration,
}

impl MemoryNodeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `nodes`, kept in `(tree_id, lft)` layout order
    pub fn with_nodes(nodes: Vec<TreeNode>) -> Self {
        let mut nodes = nodes;
        arbor_core::types::sort_by_layout(&mut nodes);
        Self {
            state: RwLock::new(MemoryState {
                nodes,
                generation: 0,
            }),
            mutation_delay: Duration::ZERO,
        }
    }

    /// Time a structural mutation spends between reading and writing
    pub fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = delay;
        self
    }

    /// Current contents in layout order
    pub async fn snapshot(&self) -> Vec<TreeNode> {
        self.state.read().await.nodes.clone()
    }

    /// Number of committed writes so far
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }
}

#[async_trait]
impl NodeStoreEffects for MemoryNodeStore {
    async fn list_nodes_ordered(&self) -> Result<Vec<TreeNode>, StoreError> {
        Ok(self.snapshot().await)
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<TreeNode>, StoreError> {
        let state = self.state.read().await;
        Ok(state.nodes.iter().find(|n| n.id == id).cloned())
    }

    async fn persist_atomic(&self, nodes: &[TreeNode]) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.nodes = apply_records(&state.nodes, nodes)?;
        state.generation += 1;
        Ok(())
    }
}

#[async_trait]
impl TreeMutationEffects for MemoryNodeStore {
    async fn move_node(&self, node: NodeId, target: Option<NodeId>) -> Result<(), StoreError> {
        let (nodes, generation) = {
            let state = self.state.read().await;
            (state.nodes.clone(), state.generation)
        };

        let relocated = relocate(nodes, node, target)?;
        if !self.mutation_delay.is_zero() {
            tokio::time::sleep(self.mutation_delay).await;
        }

        let mut state = self.state.write().await;
        if state.generation != generation {
            tracing::debug!(%node, "structural write raced with another writer");
            return Err(StoreError::StaleSnapshot { node });
        }
        state.nodes = relocated;
        state.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn forest() -> Vec<TreeNode> {
        vec![
            TreeNode::with_coordinates(NodeId(1), None, 1, 6, 1, 1),
            TreeNode::with_coordinates(NodeId(2), Some(NodeId(1)), 2, 3, 2, 1),
            TreeNode::with_coordinates(NodeId(3), Some(NodeId(1)), 4, 5, 2, 1),
        ]
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let store = MemoryNodeStore::with_nodes(forest());
        assert_eq!(store.list_nodes_ordered().await.unwrap().len(), 3);
        assert_eq!(
            store.get_node(NodeId(3)).await.unwrap().unwrap().lft,
            4
        );
        assert!(store.get_node(NodeId(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_nodes_stores_layout_order() {
        let mut shuffled = forest();
        shuffled.reverse();
        let store = MemoryNodeStore::with_nodes(shuffled);
        assert_eq!(store.snapshot().await, forest());
    }

    #[tokio::test]
    async fn test_persist_is_atomic() {
        let store = MemoryNodeStore::with_nodes(forest());
        let mut changed = forest()[1].clone();
        changed.depth = 9;

        let err = store
            .persist_atomic(&[changed.clone(), TreeNode::root(NodeId(42), 1)])
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(NodeId(42)));
        assert_eq!(store.get_node(NodeId(2)).await.unwrap().unwrap().depth, 2);
        assert_eq!(store.generation().await, 0);

        store.persist_atomic(&[changed]).await.unwrap();
        assert_eq!(store.get_node(NodeId(2)).await.unwrap().unwrap().depth, 9);
        assert_eq!(store.generation().await, 1);
    }

    #[tokio::test]
    async fn test_sequential_moves_succeed() {
        let store = MemoryNodeStore::with_nodes(forest());
        store.move_node(NodeId(2), Some(NodeId(3))).await.unwrap();
        store.move_node(NodeId(2), Some(NodeId(1))).await.unwrap();

        let nodes = store.snapshot().await;
        let ids: Vec<u64> = nodes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_moves_detect_stale_snapshot() {
        let store = Arc::new(
            MemoryNodeStore::with_nodes(forest()).with_mutation_delay(Duration::from_millis(10)),
        );

        let (first, second) = tokio::join!(
            store.move_node(NodeId(2), Some(NodeId(3))),
            store.move_node(NodeId(3), None),
        );

        let stale: Vec<StoreError> = [first, second].into_iter().filter_map(Result::err).collect();
        assert_eq!(stale.len(), 1);
        assert!(matches!(stale[0], StoreError::StaleSnapshot { .. }));
        assert_eq!(store.generation().await, 1);
    }
}
