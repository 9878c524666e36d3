//! Layer 2: Nested-Set Repair Engine
//!
//! Derives a provably consistent nested-set encoding (`lft`, `rgt`, `depth`,
//! `tree_id`) for a forest from nothing but its parent pointers, using the
//! existing `lft` values only as a sibling-ordering hint.
//!
//! **Key Types**:
//! - **ForestArena**: index-addressed slots with explicit child adjacency,
//!   validated for duplicates, orphans and cycles before any derivation
//! - **RepairedForest**: the corrected mapping `id -> node`, plus the input it
//!   was derived from
//! - **TreeSelection**: post-filter restricting reports/persistence to the
//!   trees containing chosen nodes
//! - **RepairPlan**: per-node, per-field diff between input and corrected
//!   forest
//!
//! The engine is pure and synchronous. Persistence and locking live in
//! `arbor-maintenance`.

#![forbid(unsafe_code)]

pub mod arena;
pub mod error;
pub mod plan;
pub mod repair;
pub mod verify;

pub use arena::ForestArena;
pub use error::RepairError;
pub use plan::{FieldDiff, FieldValue, NodeDiff, NodeField, RepairPlan, RepairSummary};
pub use repair::{repair_forest, RepairOptions, RepairedForest, TreeSelection};
pub use verify::{verify_forest, Violation};
