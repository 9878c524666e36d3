//! JSON snapshot node store
//!
//! The forest lives in a single JSON array of node records. Writes go to a
//! uniquely named sibling file that is then renamed over the original, so
//! readers see either the old or the new forest, never a mix. Each
//! read-modify-write holds `flock(LOCK_EX)` on `<file>.lock`, which keeps
//! writers in other handles and other processes from losing updates.

use super::{apply_records, relocate};
use crate::lockfile::{lock_exclusive_async, sibling, temp_sibling, FileLock};
use arbor_core::effects::{NodeStoreEffects, StoreError, TreeMutationEffects};
use arbor_core::{NodeId, TreeNode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Node store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileNodeStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileNodeStore {
    /// Open the store at `path`; the file is read lazily
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, ".lock");
        Self { path, lock_path }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn lock(&self) -> Result<FileLock, StoreError> {
        lock_exclusive_async(&self.lock_path).await.map_err(|e| {
            StoreError::backend(format!(
                "Failed to lock forest file {}: {}",
                self.lock_path.display(),
                e
            ))
        })
    }

    async fn read_all(&self) -> Result<Vec<TreeNode>, StoreError> {
        let contents = fs::read_to_string(&self.path).await.map_err(|e| {
            StoreError::backend(format!(
                "Failed to read forest file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let mut nodes: Vec<TreeNode> = serde_json::from_str(&contents).map_err(|e| {
            StoreError::backend(format!(
                "Failed to parse forest file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        arbor_core::types::sort_by_layout(&mut nodes);
        Ok(nodes)
    }

    async fn write_all(&self, nodes: &[TreeNode]) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(nodes)
            .map_err(|e| StoreError::backend(format!("Failed to serialize forest: {}", e)))?;

        let temp_path = temp_sibling(&self.path);
        fs::write(&temp_path, contents).await.map_err(|e| {
            StoreError::backend(format!("Failed to write temp file: {}", e))
        })?;

        // Atomic rename
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StoreError::backend(format!("Failed to rename temp file: {}", e)));
        }

        tracing::debug!(path = %self.path.display(), nodes = nodes.len(), "forest written");
        Ok(())
    }
}

#[async_trait]
impl NodeStoreEffects for JsonFileNodeStore {
    async fn list_nodes_ordered(&self) -> Result<Vec<TreeNode>, StoreError> {
        self.read_all().await
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<TreeNode>, StoreError> {
        Ok(self.read_all().await?.into_iter().find(|n| n.id == id))
    }

    async fn persist_atomic(&self, nodes: &[TreeNode]) -> Result<(), StoreError> {
        let _lock = self.lock().await?;
        let current = self.read_all().await?;
        let next = apply_records(&current, nodes)?;
        self.write_all(&next).await
    }
}

#[async_trait]
impl TreeMutationEffects for JsonFileNodeStore {
    async fn move_node(&self, node: NodeId, target: Option<NodeId>) -> Result<(), StoreError> {
        let _lock = self.lock().await?;
        let current = self.read_all().await?;
        let next = relocate(current, node, target)?;
        self.write_all(&next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_forest(dir: &Path, nodes: &[TreeNode]) -> PathBuf {
        let path = dir.join("forest.json");
        std::fs::write(&path, serde_json::to_string(nodes).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_in_layout_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_forest(
            dir.path(),
            &[
                TreeNode::with_coordinates(NodeId(2), Some(NodeId(1)), 2, 3, 2, 1),
                TreeNode::with_coordinates(NodeId(1), None, 1, 4, 1, 1),
            ],
        );
        let store = JsonFileNodeStore::new(path);

        let ids: Vec<u64> = store
            .list_nodes_ordered()
            .await
            .unwrap()
            .iter()
            .map(|n| n.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_persist_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_forest(dir.path(), &[TreeNode::with_coordinates(NodeId(1), None, 3, 9, 0, 4)]);
        let store = JsonFileNodeStore::new(&path);

        store
            .persist_atomic(&[TreeNode::root(NodeId(1), 1)])
            .await
            .unwrap();

        let reopened = JsonFileNodeStore::new(&path);
        let node = reopened.get_node(NodeId(1)).await.unwrap().unwrap();
        assert_eq!(node, TreeNode::root(NodeId(1), 1));

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["forest.json", "forest.json.lock"]);
    }

    #[tokio::test]
    async fn test_unknown_record_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let original = vec![TreeNode::root(NodeId(1), 1)];
        let path = write_forest(dir.path(), &original);
        let store = JsonFileNodeStore::new(&path);

        let err = store
            .persist_atomic(&[TreeNode::root(NodeId(5), 2)])
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(NodeId(5)));
        assert_eq!(store.list_nodes_ordered().await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_missing_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileNodeStore::new(dir.path().join("nope.json"));
        assert!(matches!(
            store.list_nodes_ordered().await.unwrap_err(),
            StoreError::Backend { .. }
        ));
    }

    #[tokio::test]
    async fn test_move_node_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_forest(
            dir.path(),
            &[TreeNode::root(NodeId(1), 1), TreeNode::root(NodeId(2), 2)],
        );
        let store = JsonFileNodeStore::new(&path);

        store.move_node(NodeId(2), Some(NodeId(1))).await.unwrap();

        let nodes = store.list_nodes_ordered().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].encloses(&nodes[1]));
        assert_eq!(nodes[1].parent_id, Some(NodeId(1)));
    }
}
