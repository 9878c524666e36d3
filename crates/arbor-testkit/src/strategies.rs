//! Property test strategies for forests
//!
//! `arb_forest` yields correctly encoded forests; `arb_corrupted_forest`
//! keeps their parent links but replaces every coordinate, which is the
//! input shape the repair engine is specified for.

use crate::ForestBuilder;
use arbor_core::types::sort_by_layout;
use arbor_core::TreeNode;
use proptest::prelude::*;
use proptest::sample::Index;

// Re-export proptest for convenience
pub use proptest;

/// Ids are spread out so they never coincide with positions.
fn node_id(position: usize) -> u64 {
    position as u64 * 7 + 3
}

/// Strategy for valid forests of 1 to `max_nodes` nodes
///
/// ```rust
/// use arbor_testkit::strategies::arb_forest;
/// use proptest::prelude::*;
///
/// proptest! {
///     #[test]
///     fn forests_are_non_empty(forest in arb_forest(12)) {
///         prop_assert!(!forest.is_empty());
///     }
/// }
/// ```
pub fn arb_forest(max_nodes: usize) -> impl Strategy<Value = Vec<TreeNode>> {
    prop::collection::vec((prop::bool::weighted(0.2), any::<Index>()), 1..=max_nodes.max(1))
        .prop_map(|shape| {
            let mut builder = ForestBuilder::new();
            for (position, (is_root, parent)) in shape.into_iter().enumerate() {
                let id = node_id(position);
                builder = if position == 0 || is_root {
                    builder.root(id)
                } else {
                    builder.child(node_id(parent.index(position)), id)
                };
            }
            builder.build()
        })
}

/// Strategy for forests with valid parent links and arbitrary coordinates,
/// listed in `(tree_id, lft)` order
pub fn arb_corrupted_forest(max_nodes: usize) -> impl Strategy<Value = Vec<TreeNode>> {
    arb_forest(max_nodes).prop_flat_map(|forest| {
        let len = forest.len();
        (
            Just(forest),
            prop::collection::vec((-20i64..40, -20i64..40, 0u32..6, 0u64..4), len),
        )
            .prop_map(|(forest, coordinates)| {
                let mut corrupted: Vec<TreeNode> = forest
                    .into_iter()
                    .zip(coordinates)
                    .map(|(node, (lft, rgt, depth, tree_id))| TreeNode {
                        lft,
                        rgt,
                        depth,
                        tree_id,
                        ..node
                    })
                    .collect();
                sort_by_layout(&mut corrupted);
                corrupted
            })
    })
}
