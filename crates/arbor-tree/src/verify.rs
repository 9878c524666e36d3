//! Read-only invariant checker for nested-set forests

use arbor_core::{NodeId, TreeNode};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A broken forest invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `lft >= rgt`
    EmptyInterval {
        /// Offending node
        node: NodeId,
    },
    /// Parent reference does not resolve
    MissingParent {
        /// Offending node
        node: NodeId,
        /// Unresolved parent id
        parent: NodeId,
    },
    /// Child interval not strictly inside its parent's
    NotNested {
        /// Child
        node: NodeId,
        /// Parent
        parent: NodeId,
    },
    /// Adjacent siblings overlap or touch
    SiblingOverlap {
        /// Left sibling
        left: NodeId,
        /// Right sibling
        right: NodeId,
    },
    /// Depth is not parent depth + 1 (or 1 for a root)
    DepthMismatch {
        /// Offending node
        node: NodeId,
        /// Stored depth
        found: u32,
        /// Depth implied by ancestry
        expected: u32,
    },
    /// Child carries a different tree id than its parent
    TreeIdMismatch {
        /// Child
        node: NodeId,
        /// Parent
        parent: NodeId,
    },
    /// Two roots claim the same tree id
    TreeIdShared {
        /// First root with the id
        first: NodeId,
        /// Second root with the id
        second: NodeId,
        /// Shared tree id
        tree_id: u64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInterval { node } => write!(f, "node {node}: lft is not below rgt"),
            Self::MissingParent { node, parent } => {
                write!(f, "node {node}: parent {parent} does not exist")
            }
            Self::NotNested { node, parent } => {
                write!(f, "node {node}: interval not nested inside parent {parent}")
            }
            Self::SiblingOverlap { left, right } => {
                write!(f, "siblings {left} and {right} overlap")
            }
            Self::DepthMismatch {
                node,
                found,
                expected,
            } => write!(f, "node {node}: depth {found}, expected {expected}"),
            Self::TreeIdMismatch { node, parent } => {
                write!(f, "node {node}: tree id differs from parent {parent}")
            }
            Self::TreeIdShared {
                first,
                second,
                tree_id,
            } => write!(f, "roots {first} and {second} share tree id {tree_id}"),
        }
    }
}

/// Check all forest invariants without modifying anything.
///
/// Depth expectations are derived from the stored parent depth, so one bad
/// depth near the root is reported once rather than for its whole subtree.
pub fn verify_forest(nodes: &[TreeNode]) -> Vec<Violation> {
    let by_id: HashMap<NodeId, &TreeNode> = nodes.iter().map(|n| (n.id, n)).collect();
    let mut violations = Vec::new();
    let mut siblings: BTreeMap<NodeId, Vec<&TreeNode>> = BTreeMap::new();
    let mut root_trees: HashMap<u64, NodeId> = HashMap::new();

    for node in nodes {
        if node.lft >= node.rgt {
            violations.push(Violation::EmptyInterval { node: node.id });
        }

        let Some(parent_id) = node.parent_id else {
            if node.depth != 1 {
                violations.push(Violation::DepthMismatch {
                    node: node.id,
                    found: node.depth,
                    expected: 1,
                });
            }
            if let Some(&first) = root_trees.get(&node.tree_id) {
                violations.push(Violation::TreeIdShared {
                    first,
                    second: node.id,
                    tree_id: node.tree_id,
                });
            } else {
                root_trees.insert(node.tree_id, node.id);
            }
            continue;
        };

        let Some(parent) = by_id.get(&parent_id) else {
            violations.push(Violation::MissingParent {
                node: node.id,
                parent: parent_id,
            });
            continue;
        };

        if node.tree_id != parent.tree_id {
            violations.push(Violation::TreeIdMismatch {
                node: node.id,
                parent: parent_id,
            });
        } else if !parent.encloses(node) {
            violations.push(Violation::NotNested {
                node: node.id,
                parent: parent_id,
            });
        }

        let expected = parent.depth + 1;
        if node.depth != expected {
            violations.push(Violation::DepthMismatch {
                node: node.id,
                found: node.depth,
                expected,
            });
        }

        siblings.entry(parent_id).or_default().push(node);
    }

    for children in siblings.values_mut() {
        children.sort_by_key(|n| (n.lft, n.id));
        for pair in children.windows(2) {
            if pair[0].rgt >= pair[1].lft {
                violations.push(Violation::SiblingOverlap {
                    left: pair[0].id,
                    right: pair[1].id,
                });
            }
        }
    }

    violations
}
