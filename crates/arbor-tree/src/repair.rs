//! Deterministic nested-set reconstruction
//!
//! ## Algorithm
//!
//! 1. Root normalization: every root, in input order, gets the next
//!    sequential `tree_id` (from 1) and the encoding `(1, 2, depth 1)`.
//! 2. Child insertion, in arena pre-order:
//!    - first child of `p`: `lft = p.lft + 1`, `depth = p.depth + 1`
//!    - later child: `lft = s.rgt + 1`, `depth = s.depth`, where `s` is the
//!      most recently inserted sibling
//!    - `rgt = lft + 1`, `tree_id = p.tree_id`
//!    - walk from the new node up to its root, setting each ancestor's
//!      `rgt` to one past the previous node's `rgt` on the walk
//!
//! Pre-order guarantees a node's parent and all earlier siblings' subtrees
//! are complete before it is inserted, so the ancestor walk only ever has
//! to widen right bounds. Cost is O(n·d).
//!
//! The whole forest is always repaired; `TreeSelection` narrows what is
//! reported or persisted afterwards. Root numbering depends on every root
//! in the input, so repairing one tree in isolation could hand out a
//! `tree_id` that collides with another tree.

use crate::arena::ForestArena;
use crate::error::RepairError;
use arbor_core::{NodeId, TreeNode};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Engine options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairOptions {
    /// Fail when any node's derived depth exceeds this
    pub max_depth: Option<u32>,
}

impl RepairOptions {
    /// Options with a depth limit
    pub fn with_max_depth(limit: u32) -> Self {
        Self {
            max_depth: Some(limit),
        }
    }
}

/// Result of a repair run. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedForest {
    original: IndexMap<NodeId, TreeNode>,
    corrected: IndexMap<NodeId, TreeNode>,
    tree_count: u64,
}

/// Which trees a report or commit is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSelection {
    /// Every tree in the forest
    All,
    /// Only the listed (corrected) tree ids
    Trees(BTreeSet<u64>),
}

impl TreeSelection {
    /// Whether a corrected node falls inside the selection
    pub fn contains(&self, node: &TreeNode) -> bool {
        match self {
            Self::All => true,
            Self::Trees(trees) => trees.contains(&node.tree_id),
        }
    }
}

/// Repair `nodes`, given in store layout order (`tree_id`, `lft`).
pub fn repair_forest(
    nodes: &[TreeNode],
    options: RepairOptions,
) -> Result<RepairedForest, RepairError> {
    let arena = ForestArena::load(nodes)?;
    let mut corrected: Vec<TreeNode> = arena.nodes().cloned().collect();

    // Phase 1: root normalization
    let mut tree_count = 0u64;
    for &root in arena.roots() {
        tree_count += 1;
        let node = &mut corrected[root];
        node.tree_id = tree_count;
        node.lft = 1;
        node.rgt = 2;
        node.depth = 1;
    }

    // Phase 2: child insertion
    let mut last_child: Vec<Option<usize>> = vec![None; arena.len()];
    for &position in arena.preorder() {
        let Some(parent) = arena.parent(position) else {
            continue;
        };

        let (lft, depth) = match last_child[parent] {
            None => (corrected[parent].lft + 1, corrected[parent].depth + 1),
            Some(sibling) => (corrected[sibling].rgt + 1, corrected[sibling].depth),
        };
        if let Some(limit) = options.max_depth {
            if depth > limit {
                return Err(RepairError::DepthLimitExceeded {
                    node: corrected[position].id,
                    depth,
                    limit,
                });
            }
        }

        let tree_id = corrected[parent].tree_id;
        let node = &mut corrected[position];
        node.lft = lft;
        node.rgt = lft + 1;
        node.depth = depth;
        node.tree_id = tree_id;
        last_child[parent] = Some(position);

        // Ancestor propagation
        let mut previous = position;
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            corrected[current].rgt = corrected[previous].rgt + 1;
            previous = current;
            ancestor = arena.parent(current);
        }
    }

    tracing::debug!(
        nodes = corrected.len(),
        trees = tree_count,
        "derived nested-set encoding"
    );

    Ok(RepairedForest {
        original: nodes.iter().map(|n| (n.id, n.clone())).collect(),
        corrected: corrected.into_iter().map(|n| (n.id, n)).collect(),
        tree_count,
    })
}

impl RepairedForest {
    /// Corrected record for `id`
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.corrected.get(&id)
    }

    /// Input record for `id`
    pub fn original(&self, id: NodeId) -> Option<&TreeNode> {
        self.original.get(&id)
    }

    /// Corrected mapping in input order
    pub fn corrected(&self) -> &IndexMap<NodeId, TreeNode> {
        &self.corrected
    }

    /// Number of nodes repaired
    pub fn len(&self) -> usize {
        self.corrected.len()
    }

    /// Whether the forest was empty
    pub fn is_empty(&self) -> bool {
        self.corrected.is_empty()
    }

    /// Number of distinct trees after repair
    pub fn tree_count(&self) -> u64 {
        self.tree_count
    }

    /// Corrected nodes sorted by `(tree_id, lft)`, the order a store would
    /// list them after commit.
    pub fn layout(&self) -> Vec<TreeNode> {
        let mut nodes: Vec<TreeNode> = self.corrected.values().cloned().collect();
        arbor_core::types::sort_by_layout(&mut nodes);
        nodes
    }

    /// Selection covering the trees that contain each of `targets`.
    ///
    /// An empty slice selects the whole forest.
    pub fn select_trees(&self, targets: &[NodeId]) -> Result<TreeSelection, RepairError> {
        if targets.is_empty() {
            return Ok(TreeSelection::All);
        }
        let mut trees = BTreeSet::new();
        for &target in targets {
            let node = self
                .corrected
                .get(&target)
                .ok_or(RepairError::UnknownNode { node: target })?;
            trees.insert(node.tree_id);
        }
        Ok(TreeSelection::Trees(trees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, parent: Option<u64>, lft: i64, rgt: i64, depth: u32, tree: u64) -> TreeNode {
        TreeNode::with_coordinates(NodeId(id), parent.map(NodeId), lft, rgt, depth, tree)
    }

    fn coords(forest: &RepairedForest, id: u64) -> (i64, i64, u32, u64) {
        let n = forest.get(NodeId(id)).unwrap();
        (n.lft, n.rgt, n.depth, n.tree_id)
    }

    #[test]
    fn test_three_node_tree() {
        // Store order by (tree_id, lft): child1 (lft 1) sorts ahead of root.
        let input = vec![
            node(2, Some(1), 1, 4, 0, 1),
            node(1, None, 2, 6, 0, 1),
            node(3, Some(1), 4, 5, 0, 1),
        ];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();

        assert_eq!(coords(&forest, 1), (1, 6, 1, 1));
        assert_eq!(coords(&forest, 2), (2, 3, 2, 1));
        assert_eq!(coords(&forest, 3), (4, 5, 2, 1));
    }

    #[test]
    fn test_deep_chain_propagates_to_root() {
        let input = vec![
            node(1, None, 1, 2, 1, 1),
            node(2, Some(1), 9, 9, 9, 1),
            node(3, Some(2), 9, 9, 9, 1),
            node(4, Some(3), 9, 9, 9, 1),
            node(5, Some(1), 20, 21, 9, 1),
        ];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();

        assert_eq!(coords(&forest, 1), (1, 10, 1, 1));
        assert_eq!(coords(&forest, 2), (2, 7, 2, 1));
        assert_eq!(coords(&forest, 3), (3, 6, 3, 1));
        assert_eq!(coords(&forest, 4), (4, 5, 4, 1));
        assert_eq!(coords(&forest, 5), (8, 9, 2, 1));
    }

    #[test]
    fn test_roots_numbered_in_input_order() {
        let input = vec![
            node(10, None, 1, 4, 1, 7),
            node(11, Some(10), 2, 3, 2, 7),
            node(20, None, 1, 2, 1, 7),
        ];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();

        assert_eq!(forest.tree_count(), 2);
        assert_eq!(coords(&forest, 10).3, 1);
        assert_eq!(coords(&forest, 11).3, 1);
        assert_eq!(coords(&forest, 20), (1, 2, 1, 2));
    }

    #[test]
    fn test_orphan_fails_loudly() {
        let input = vec![node(1, None, 1, 4, 1, 1), node(2, Some(42), 2, 3, 2, 1)];
        let err = repair_forest(&input, RepairOptions::default()).unwrap_err();
        assert_eq!(
            err,
            RepairError::CorruptTree {
                node: NodeId(2),
                missing_parent: NodeId(42),
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let input = vec![
            node(1, None, 1, 6, 1, 1),
            node(2, Some(1), 2, 5, 2, 1),
            node(3, Some(2), 3, 4, 3, 1),
        ];
        assert!(repair_forest(&input, RepairOptions::with_max_depth(3)).is_ok());

        let err = repair_forest(&input, RepairOptions::with_max_depth(2)).unwrap_err();
        assert_eq!(
            err,
            RepairError::DepthLimitExceeded {
                node: NodeId(3),
                depth: 3,
                limit: 2,
            }
        );
    }

    #[test]
    fn test_select_trees() {
        let input = vec![
            node(1, None, 1, 4, 1, 1),
            node(2, Some(1), 2, 3, 2, 1),
            node(3, None, 1, 2, 1, 2),
        ];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();

        assert_eq!(forest.select_trees(&[]).unwrap(), TreeSelection::All);

        let selection = forest.select_trees(&[NodeId(2)]).unwrap();
        assert!(selection.contains(forest.get(NodeId(1)).unwrap()));
        assert!(!selection.contains(forest.get(NodeId(3)).unwrap()));

        let err = forest.select_trees(&[NodeId(99)]).unwrap_err();
        assert_eq!(err, RepairError::UnknownNode { node: NodeId(99) });
    }

    #[test]
    fn test_empty_forest() {
        let forest = repair_forest(&[], RepairOptions::default()).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.tree_count(), 0);
    }
}
