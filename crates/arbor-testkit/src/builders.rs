//! Builder for valid nested-set forests

use arbor_core::{NodeId, TreeNode};
use std::collections::HashMap;

/// Describes a forest by parent links and lays it out correctly.
///
/// Roots get `tree_id` 1, 2, ... in the order they were added and children
/// keep the order in which they were added.
///
/// ```rust
/// use arbor_testkit::ForestBuilder;
///
/// let nodes = ForestBuilder::new().root(1).child(1, 2).build();
/// assert_eq!((nodes[0].lft, nodes[0].rgt), (1, 4));
/// assert_eq!((nodes[1].lft, nodes[1].rgt), (2, 3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    entries: Vec<(NodeId, Option<NodeId>)>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(id, parent)` pairs; parents must precede their children.
    pub fn from_parents(pairs: &[(u64, Option<u64>)]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |builder, &(id, parent)| match parent {
                Some(parent) => builder.child(parent, id),
                None => builder.root(id),
            })
    }

    pub fn root(mut self, id: u64) -> Self {
        self.entries.push((NodeId(id), None));
        self
    }

    /// Append `id` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// If `parent` has not been added yet.
    pub fn child(mut self, parent: u64, id: u64) -> Self {
        assert!(
            self.entries.iter().any(|(existing, _)| existing.0 == parent),
            "parent {parent} must be added before child {id}"
        );
        self.entries.push((NodeId(id), Some(NodeId(parent))));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Correctly encoded nodes in layout order.
    pub fn build(&self) -> Vec<TreeNode> {
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut roots = Vec::new();
        for &(id, parent) in &self.entries {
            match parent {
                Some(parent) => children.entry(parent).or_default().push(id),
                None => roots.push(id),
            }
        }

        let mut out = Vec::with_capacity(self.entries.len());
        for (index, root) in roots.into_iter().enumerate() {
            let mut counter = 1;
            lay_out(
                root,
                None,
                1,
                index as u64 + 1,
                &children,
                &mut counter,
                &mut out,
            );
        }
        out
    }
}

fn lay_out(
    id: NodeId,
    parent: Option<NodeId>,
    depth: u32,
    tree_id: u64,
    children: &HashMap<NodeId, Vec<NodeId>>,
    counter: &mut i64,
    out: &mut Vec<TreeNode>,
) {
    let position = out.len();
    out.push(TreeNode::with_coordinates(
        id, parent, *counter, 0, depth, tree_id,
    ));
    *counter += 1;
    for &child in children.get(&id).map(Vec::as_slice).unwrap_or_default() {
        lay_out(child, Some(id), depth + 1, tree_id, children, counter, out);
    }
    out[position].rgt = *counter;
    *counter += 1;
}
