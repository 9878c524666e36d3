//! Node store handlers

mod file;
mod memory;

pub use file::JsonFileNodeStore;
pub use memory::MemoryNodeStore;

use arbor_core::effects::StoreError;
use arbor_core::{NodeId, TreeNode};
use arbor_tree::{repair_forest, RepairOptions};
use std::collections::HashMap;

/// Re-home `node` as the last child of `target` (or as the last root) and
/// return the re-encoded forest in layout order.
pub(crate) fn relocate(
    mut nodes: Vec<TreeNode>,
    node: NodeId,
    target: Option<NodeId>,
) -> Result<Vec<TreeNode>, StoreError> {
    let parents: HashMap<NodeId, Option<NodeId>> =
        nodes.iter().map(|n| (n.id, n.parent_id)).collect();
    if !parents.contains_key(&node) {
        return Err(StoreError::NotFound(node));
    }

    if let Some(target) = target {
        if !parents.contains_key(&target) {
            return Err(StoreError::NotFound(target));
        }
        let mut cursor = Some(target);
        let mut steps = 0usize;
        while let Some(current) = cursor {
            if current == node {
                return Err(StoreError::DescendantCycle { node, target });
            }
            steps += 1;
            if steps > parents.len() {
                return Err(StoreError::backend(format!(
                    "parent cycle above node {target}"
                )));
            }
            cursor = parents.get(&current).copied().flatten();
        }
    }

    let position = nodes
        .iter()
        .position(|n| n.id == node)
        .ok_or(StoreError::NotFound(node))?;
    let mut moved = nodes.remove(position);
    moved.parent_id = target;
    nodes.push(moved);

    let forest = repair_forest(&nodes, RepairOptions::default())
        .map_err(|e| StoreError::backend(e.to_string()))?;
    Ok(forest.layout())
}

/// Replace records by id, failing without changes if any id is unknown.
pub(crate) fn apply_records(
    current: &[TreeNode],
    updates: &[TreeNode],
) -> Result<Vec<TreeNode>, StoreError> {
    let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(current.len());
    for (position, node) in current.iter().enumerate() {
        index.insert(node.id, position);
    }

    let mut next = current.to_vec();
    for update in updates {
        let position = *index
            .get(&update.id)
            .ok_or(StoreError::NotFound(update.id))?;
        next[position] = update.clone();
    }
    arbor_core::types::sort_by_layout(&mut next);
    Ok(next)
}
