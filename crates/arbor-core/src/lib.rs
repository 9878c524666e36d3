//! # Arbor Core - Layer 1: Foundation Types
//!
//! Shared vocabulary for the content-tree integrity layer:
//! - `types` - the nested-set node record and its identifiers
//! - `errors` - the unified `ArborError` and `Result` alias
//! - `effects` - effect traits for the node store, lease cache and reporter
//! - `config` - TOML-backed configuration for locking and repair
//!
//! Nothing in this crate performs I/O on its own apart from config loading;
//! storage, caching and output are supplied by handlers in `arbor-effects`.

#![forbid(unsafe_code)]

pub mod config;
pub mod effects;
pub mod errors;
pub mod types;

pub use config::{ArborConfig, LockConfig, RepairConfig, StoreConfig};
pub use errors::{ArborError, Result};
pub use types::{NodeId, TreeNode};
