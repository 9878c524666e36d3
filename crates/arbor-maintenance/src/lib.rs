//! Layer 4: Tree Maintenance
//!
//! Operator-facing operations over a stored forest. Each structural write
//! runs inside the tree mutex:
//!
//! - `TreeMaintenance::repair_tree`: load the whole forest, repair it, report
//!   per-node diffs for the selected trees and optionally persist the changed
//!   records in one atomic write
//! - `move_node_locked`: the store's non-transactional move primitive,
//!   serialized against every other wrapped writer
//! - `TreeMaintenance::check`: read-only invariant check, no lock taken

#![forbid(unsafe_code)]

pub mod error;
pub mod maintenance;

pub use error::MaintenanceError;
pub use maintenance::{move_node_locked, RepairOutcome, RepairRequest, TreeMaintenance};
