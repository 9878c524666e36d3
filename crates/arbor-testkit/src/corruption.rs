//! Controlled damage to otherwise valid forests
//!
//! Every helper keeps `id` and `parent_id` intact: the repair engine only
//! trusts parent links, so these are exactly the corruptions it must undo.

use arbor_core::types::sort_by_layout;
use arbor_core::{NodeId, TreeNode};

/// Overwrite `lft`, `rgt`, `depth` and `tree_id` with deterministic junk.
///
/// The result is re-sorted by `(tree_id, lft)` the way a store would list it.
pub fn scramble_coordinates(nodes: &[TreeNode], seed: u64) -> Vec<TreeNode> {
    let mut state = seed;
    let mut scrambled: Vec<TreeNode> = nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            node.lft = (splitmix(&mut state) % 64) as i64 - 16;
            node.rgt = (splitmix(&mut state) % 64) as i64 - 16;
            node.depth = (splitmix(&mut state) % 6) as u32;
            node.tree_id = splitmix(&mut state) % 3;
            node
        })
        .collect();
    sort_by_layout(&mut scrambled);
    scrambled
}

/// Coordinates of freshly inserted rows that were never laid out.
pub fn zero_coordinates(nodes: &[TreeNode]) -> Vec<TreeNode> {
    nodes
        .iter()
        .map(|node| TreeNode::with_coordinates(node.id, node.parent_id, 0, 0, 0, 0))
        .collect()
}

/// Force every node onto one `tree_id`, entangling separate trees.
pub fn collide_tree_ids(nodes: &[TreeNode], tree_id: u64) -> Vec<TreeNode> {
    let mut collided: Vec<TreeNode> = nodes
        .iter()
        .map(|node| TreeNode {
            tree_id,
            ..node.clone()
        })
        .collect();
    sort_by_layout(&mut collided);
    collided
}

/// Point `node` at a parent that does not exist.
pub fn orphan(nodes: &[TreeNode], node: u64, missing_parent: u64) -> Vec<TreeNode> {
    nodes
        .iter()
        .map(|n| {
            if n.id == NodeId(node) {
                TreeNode {
                    parent_id: Some(NodeId(missing_parent)),
                    ..n.clone()
                }
            } else {
                n.clone()
            }
        })
        .collect()
}

fn splitmix(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForestBuilder;

    fn forest() -> Vec<TreeNode> {
        ForestBuilder::new().root(1).child(1, 2).child(1, 3).root(4).build()
    }

    #[test]
    fn test_scramble_keeps_parent_links() {
        let original = forest();
        let scrambled = scramble_coordinates(&original, 7);

        assert_eq!(scrambled.len(), original.len());
        for node in &original {
            let twin = scrambled.iter().find(|n| n.id == node.id).unwrap();
            assert_eq!(twin.parent_id, node.parent_id);
        }
        assert_eq!(scrambled, scramble_coordinates(&original, 7));
    }

    #[test]
    fn test_collide_tree_ids() {
        let collided = collide_tree_ids(&forest(), 1);
        assert!(collided.iter().all(|n| n.tree_id == 1));
    }

    #[test]
    fn test_orphan_rewrites_one_parent() {
        let nodes = orphan(&forest(), 3, 99);
        let changed: Vec<_> = nodes
            .iter()
            .filter(|n| n.parent_id == Some(NodeId(99)))
            .map(|n| n.id)
            .collect();
        assert_eq!(changed, vec![NodeId(3)]);
    }
}
