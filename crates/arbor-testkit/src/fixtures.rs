//! Named forests used across crates

use arbor_core::{NodeId, TreeNode};

/// Three-node tree whose first child sorts before its own root.
///
/// Listed in store order, so node 2 comes first.
pub fn scenario_a() -> Vec<TreeNode> {
    vec![
        TreeNode::with_coordinates(NodeId(2), Some(NodeId(1)), 1, 4, 0, 1),
        TreeNode::with_coordinates(NodeId(1), None, 2, 6, 0, 1),
        TreeNode::with_coordinates(NodeId(3), Some(NodeId(1)), 4, 5, 0, 1),
    ]
}

/// Correct encoding of [`scenario_a`].
pub fn scenario_a_expected() -> Vec<TreeNode> {
    vec![
        TreeNode::with_coordinates(NodeId(1), None, 1, 6, 1, 1),
        TreeNode::with_coordinates(NodeId(2), Some(NodeId(1)), 2, 3, 2, 1),
        TreeNode::with_coordinates(NodeId(3), Some(NodeId(1)), 4, 5, 2, 1),
    ]
}

/// Two disjoint trees sharing `tree_id` 1 and identical intervals.
///
/// Tree rooted at 10 has children 11 and 12; tree rooted at 20 is the
/// chain 20 → 21 → 22.
pub fn scenario_b() -> Vec<TreeNode> {
    vec![
        TreeNode::with_coordinates(NodeId(10), None, 1, 6, 1, 1),
        TreeNode::with_coordinates(NodeId(20), None, 1, 6, 1, 1),
        TreeNode::with_coordinates(NodeId(11), Some(NodeId(10)), 2, 3, 2, 1),
        TreeNode::with_coordinates(NodeId(21), Some(NodeId(20)), 2, 5, 2, 1),
        TreeNode::with_coordinates(NodeId(22), Some(NodeId(21)), 3, 4, 3, 1),
        TreeNode::with_coordinates(NodeId(12), Some(NodeId(10)), 4, 5, 2, 1),
    ]
}

/// Ids of the two trees in [`scenario_b`], root first.
pub const SCENARIO_B_TREES: [[u64; 3]; 2] = [[10, 11, 12], [20, 21, 22]];
