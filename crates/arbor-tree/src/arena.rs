//! Arena representation of a parent-pointer forest
//!
//! Nodes live in a `Vec` in input order and refer to each other by slot
//! index. Child lists preserve input order, which is the `(tree_id, lft)`
//! order the store lists nodes in, so siblings keep their historical
//! left-to-right arrangement even when the coordinates themselves are
//! corrupt.

use crate::error::RepairError;
use arbor_core::{NodeId, TreeNode};
use std::collections::HashMap;

/// One node plus its resolved adjacency.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) node: TreeNode,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
}

/// Validated, index-addressed forest.
#[derive(Debug, Clone)]
pub struct ForestArena {
    slots: Vec<Slot>,
    index: HashMap<NodeId, usize>,
    roots: Vec<usize>,
    preorder: Vec<usize>,
}

impl ForestArena {
    /// Build the arena and reject forests that cannot be repaired.
    ///
    /// Checks run in this order: duplicate ids, dangling parent references,
    /// nodes unreachable from any root.
    pub fn load(nodes: &[TreeNode]) -> Result<Self, RepairError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if index.insert(node.id, position).is_some() {
                return Err(RepairError::DuplicateNode { node: node.id });
            }
        }

        let mut slots: Vec<Slot> = nodes
            .iter()
            .map(|node| Slot {
                node: node.clone(),
                parent: None,
                children: Vec::new(),
            })
            .collect();
        let mut roots = Vec::new();

        for position in 0..slots.len() {
            match slots[position].node.parent_id {
                None => roots.push(position),
                Some(parent_id) => {
                    let parent = *index.get(&parent_id).ok_or(RepairError::CorruptTree {
                        node: slots[position].node.id,
                        missing_parent: parent_id,
                    })?;
                    slots[position].parent = Some(parent);
                    slots[parent].children.push(position);
                }
            }
        }

        let preorder = walk_preorder(&slots, &roots);
        if preorder.len() < slots.len() {
            let mut reached = vec![false; slots.len()];
            for &position in &preorder {
                reached[position] = true;
            }
            if let Some(position) = reached.iter().position(|seen| !seen) {
                return Err(RepairError::CycleDetected {
                    node: slots[position].node.id,
                });
            }
        }

        Ok(Self {
            slots,
            index,
            roots,
            preorder,
        })
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the forest has no nodes
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot index of `id`
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Input record at `position`
    pub fn node(&self, position: usize) -> &TreeNode {
        &self.slots[position].node
    }

    /// Slot index of the parent of `position`
    pub fn parent(&self, position: usize) -> Option<usize> {
        self.slots[position].parent
    }

    /// Children of `position` in input order
    pub fn children(&self, position: usize) -> &[usize] {
        &self.slots[position].children
    }

    /// Roots in input order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Parents before children, siblings in input order, trees in root order.
    pub fn preorder(&self) -> &[usize] {
        &self.preorder
    }

    /// Input records in input order
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.slots.iter().map(|slot| &slot.node)
    }
}

fn walk_preorder(slots: &[Slot], roots: &[usize]) -> Vec<usize> {
    let mut order = Vec::with_capacity(slots.len());
    let mut stack = Vec::new();
    for &root in roots {
        stack.push(root);
        while let Some(position) = stack.pop() {
            order.push(position);
            stack.extend(slots[position].children.iter().rev().copied());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, parent: Option<u64>, lft: i64) -> TreeNode {
        TreeNode::with_coordinates(NodeId(id), parent.map(NodeId), lft, lft + 1, 1, 1)
    }

    #[test]
    fn test_adjacency_preserves_input_order() {
        let arena = ForestArena::load(&[
            node(1, None, 1),
            node(3, Some(1), 2),
            node(2, Some(1), 4),
            node(4, Some(3), 3),
        ])
        .unwrap();

        assert_eq!(arena.roots(), &[0]);
        assert_eq!(arena.children(0), &[1, 2]);
        assert_eq!(arena.children(1), &[3]);
        assert_eq!(arena.parent(3), Some(1));
        assert_eq!(arena.preorder(), &[0, 1, 3, 2]);
    }

    #[test]
    fn test_preorder_visits_children_listed_before_parent() {
        // Child sorts ahead of its parent because its lft is corrupt.
        let arena = ForestArena::load(&[
            node(1, None, 1),
            node(3, Some(2), 2),
            node(2, Some(1), 5),
        ])
        .unwrap();

        assert_eq!(arena.preorder(), &[0, 2, 1]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = ForestArena::load(&[node(1, None, 1), node(1, None, 3)]).unwrap_err();
        assert_eq!(err, RepairError::DuplicateNode { node: NodeId(1) });
    }

    #[test]
    fn test_orphan_rejected() {
        let err = ForestArena::load(&[node(1, None, 1), node(2, Some(9), 2)]).unwrap_err();
        assert_eq!(
            err,
            RepairError::CorruptTree {
                node: NodeId(2),
                missing_parent: NodeId(9),
            }
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let err = ForestArena::load(&[
            node(1, None, 1),
            node(2, Some(3), 2),
            node(3, Some(2), 3),
        ])
        .unwrap_err();
        assert_eq!(err, RepairError::CycleDetected { node: NodeId(2) });
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let err = ForestArena::load(&[node(5, Some(5), 1)]).unwrap_err();
        assert_eq!(err, RepairError::CycleDetected { node: NodeId(5) });
    }

    #[test]
    fn test_empty_forest() {
        let arena = ForestArena::load(&[]).unwrap();
        assert!(arena.is_empty());
        assert!(arena.preorder().is_empty());
    }
}
