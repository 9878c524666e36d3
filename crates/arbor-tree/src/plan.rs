//! Field-level diff between an input forest and its repaired form
//!
//! A `RepairPlan` is what operators see on a dry run and what gets
//! persisted on commit: only nodes inside the selection, and on commit only
//! those with at least one changed field.

use crate::repair::{RepairedForest, TreeSelection};
use arbor_core::effects::ReportEffects;
use arbor_core::{NodeId, TreeNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported node fields, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeField {
    /// Parent reference
    ParentId,
    /// Tree identifier
    TreeId,
    /// Depth
    Depth,
    /// Left bound
    Lft,
    /// Right bound
    Rgt,
}

impl NodeField {
    /// All fields in report order
    pub const ALL: [NodeField; 5] = [
        NodeField::ParentId,
        NodeField::TreeId,
        NodeField::Depth,
        NodeField::Lft,
        NodeField::Rgt,
    ];

    /// Column name
    pub fn name(self) -> &'static str {
        match self {
            Self::ParentId => "parent_id",
            Self::TreeId => "tree_id",
            Self::Depth => "depth",
            Self::Lft => "lft",
            Self::Rgt => "rgt",
        }
    }

    fn read(self, node: &TreeNode) -> FieldValue {
        match self {
            Self::ParentId => node.parent_id.map_or(FieldValue::Absent, FieldValue::Id),
            Self::TreeId => FieldValue::Uint(node.tree_id),
            Self::Depth => FieldValue::Int(i64::from(node.depth)),
            Self::Lft => FieldValue::Int(node.lft),
            Self::Rgt => FieldValue::Int(node.rgt),
        }
    }
}

/// A single field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value (root parent)
    Absent,
    /// Node reference
    Id(NodeId),
    /// Numeric coordinate
    Int(i64),
    /// Unsigned identifier
    Uint(u64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "None"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
        }
    }
}

/// One field before and after repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Field compared
    pub field: NodeField,
    /// Input value
    pub before: FieldValue,
    /// Corrected value
    pub after: FieldValue,
}

impl FieldDiff {
    /// Whether repair changed this field
    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }
}

/// All reported fields of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDiff {
    /// Node compared
    pub id: NodeId,
    /// Per-field comparison in `NodeField::ALL` order
    pub fields: Vec<FieldDiff>,
    /// Corrected record
    pub corrected: TreeNode,
}

impl NodeDiff {
    fn between(before: &TreeNode, after: &TreeNode) -> Self {
        let fields = NodeField::ALL
            .iter()
            .map(|&field| FieldDiff {
                field,
                before: field.read(before),
                after: field.read(after),
            })
            .collect();
        Self {
            id: after.id,
            fields,
            corrected: after.clone(),
        }
    }

    /// Whether any field changed
    pub fn is_changed(&self) -> bool {
        self.fields.iter().any(FieldDiff::is_changed)
    }
}

/// Counts describing a repair run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// Nodes loaded and repaired
    pub scanned: usize,
    /// Nodes inside the selection
    pub selected: usize,
    /// Selected nodes with at least one changed field
    pub changed: usize,
    /// Whether changes were persisted
    pub committed: bool,
}

/// Selected node diffs, ordered by corrected `(tree_id, lft)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPlan {
    /// Per-node diffs
    pub diffs: Vec<NodeDiff>,
    /// Size of the forest the plan was cut from
    pub scanned: usize,
}

impl RepairPlan {
    /// Diff every selected node of `forest` against its input record.
    pub fn build(forest: &RepairedForest, selection: &TreeSelection) -> Self {
        let diffs = forest
            .layout()
            .iter()
            .filter(|node| selection.contains(node))
            .filter_map(|after| {
                forest
                    .original(after.id)
                    .map(|before| NodeDiff::between(before, after))
            })
            .collect();
        Self {
            diffs,
            scanned: forest.len(),
        }
    }

    /// Corrected records that differ from their input
    pub fn changed_nodes(&self) -> Vec<TreeNode> {
        self.diffs
            .iter()
            .filter(|diff| diff.is_changed())
            .map(|diff| diff.corrected.clone())
            .collect()
    }

    /// Whether the selection is already consistent
    pub fn is_clean(&self) -> bool {
        self.diffs.iter().all(|diff| !diff.is_changed())
    }

    /// Counts for this plan
    pub fn summary(&self, committed: bool) -> RepairSummary {
        RepairSummary {
            scanned: self.scanned,
            selected: self.diffs.len(),
            changed: self.diffs.iter().filter(|diff| diff.is_changed()).count(),
            committed,
        }
    }

    /// Describe every field of every selected node.
    pub fn report(&self, reporter: &dyn ReportEffects) {
        for diff in &self.diffs {
            reporter.print(&format!("Node {}", reporter.bold(&diff.id.to_string())));
            for field in &diff.fields {
                if field.is_changed() {
                    reporter.write("  ");
                    reporter.error(&format!(
                        "{}: {} -> {} (corrected)",
                        field.field.name(),
                        field.before,
                        field.after
                    ));
                } else {
                    reporter.write("  ");
                    reporter.success(&format!("{}: {} (ok)", field.field.name(), field.after));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::{repair_forest, RepairOptions};

    fn node(id: u64, parent: Option<u64>, lft: i64, rgt: i64, depth: u32, tree: u64) -> TreeNode {
        TreeNode::with_coordinates(NodeId(id), parent.map(NodeId), lft, rgt, depth, tree)
    }

    #[test]
    fn test_clean_forest_has_no_changes() {
        let input = vec![node(1, None, 1, 4, 1, 1), node(2, Some(1), 2, 3, 2, 1)];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();
        let plan = RepairPlan::build(&forest, &TreeSelection::All);

        assert!(plan.is_clean());
        assert!(plan.changed_nodes().is_empty());
        assert_eq!(plan.summary(false).selected, 2);
    }

    #[test]
    fn test_changed_fields_are_tracked() {
        let input = vec![node(1, None, 1, 9, 1, 1), node(2, Some(1), 2, 3, 5, 1)];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();
        let plan = RepairPlan::build(&forest, &TreeSelection::All);

        let root = &plan.diffs[0];
        let changed: Vec<NodeField> = root
            .fields
            .iter()
            .filter(|f| f.is_changed())
            .map(|f| f.field)
            .collect();
        assert_eq!(changed, vec![NodeField::Rgt]);

        let child = &plan.diffs[1];
        assert!(child
            .fields
            .iter()
            .any(|f| f.field == NodeField::Depth && f.before == FieldValue::Int(5)));

        let summary = plan.summary(true);
        assert_eq!(summary.changed, 2);
        assert!(summary.committed);
    }

    #[test]
    fn test_plan_respects_selection() {
        let input = vec![
            node(1, None, 1, 2, 1, 1),
            node(2, None, 1, 5, 1, 2),
            node(3, Some(2), 7, 8, 1, 2),
        ];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();
        let selection = forest.select_trees(&[NodeId(3)]).unwrap();
        let plan = RepairPlan::build(&forest, &selection);

        let ids: Vec<NodeId> = plan.diffs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![NodeId(2), NodeId(3)]);
        assert_eq!(plan.scanned, 3);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Absent.to_string(), "None");
        assert_eq!(FieldValue::Id(NodeId(4)).to_string(), "4");
        assert_eq!(FieldValue::Int(-2).to_string(), "-2");
        assert_eq!(FieldValue::Uint(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_huge_tree_id_is_reported_unsigned() {
        let input = vec![node(1, None, 1, 2, 1, u64::MAX)];
        let forest = repair_forest(&input, RepairOptions::default()).unwrap();
        let plan = RepairPlan::build(&forest, &TreeSelection::All);

        let tree_id = plan.diffs[0]
            .fields
            .iter()
            .find(|f| f.field == NodeField::TreeId)
            .unwrap();
        assert_eq!(tree_id.before, FieldValue::Uint(u64::MAX));
        assert_eq!(tree_id.after, FieldValue::Uint(1));
        assert_eq!(tree_id.before.to_string(), u64::MAX.to_string());
    }
}
