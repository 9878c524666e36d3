//! Effect traits consumed by the integrity layer
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effects
//! - **Implementation**: `arbor-effects` (Layer 3)
//! - **Usage**: `arbor-lock`, `arbor-maintenance`, `arbor-cli`
//!
//! The repair engine itself is pure and never touches these traits; they
//! describe the collaborators around it.

pub mod cache;
pub mod report;
pub mod store;

pub use cache::{CacheError, LeaseCacheEffects};
pub use report::ReportEffects;
pub use store::{NodeStoreEffects, StoreError, TreeMutationEffects};
