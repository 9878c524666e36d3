//! Arbor Testing Infrastructure
//!
//! Shared fixtures for the arbor crates: a builder for valid forests,
//! helpers that corrupt them in controlled ways, proptest strategies and a
//! reporter that records every line it is given.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]
//!
//! # Usage
//!
//! ```rust
//! use arbor_testkit::ForestBuilder;
//!
//! let forest = ForestBuilder::new().root(1).child(1, 2).child(1, 3).build();
//! assert_eq!(forest.len(), 3);
//! ```

pub mod builders;
pub mod corruption;
pub mod fixtures;
pub mod reporter;
pub mod strategies;

pub use builders::ForestBuilder;
pub use corruption::{collide_tree_ids, orphan, scramble_coordinates, zero_coordinates};
pub use fixtures::*;
pub use reporter::{RecordingReporter, ReportLine};
pub use strategies::{arb_corrupted_forest, arb_forest};

pub use arbor_core::{NodeId, TreeNode};

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
