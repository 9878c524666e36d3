//! Arbor Effect Handlers - Layer 3
//!
//! Concrete implementations of the effect traits defined in `arbor-core`:
//! - `store` - in-memory and JSON-file node stores
//! - `cache` - in-memory and file-backed lease caches
//! - `report` - tracing and styled terminal reporters
//!
//! Handlers are stateless apart from the backing data they wrap. The file
//! backends coordinate through `flock` and therefore target unix hosts.

#![forbid(unsafe_code)]

pub mod cache;
mod lockfile;
pub mod report;
pub mod store;

pub use cache::{FileLeaseCache, MemoryLeaseCache};
pub use report::{TerminalReporter, TracingReporter};
pub use store::{JsonFileNodeStore, MemoryNodeStore};
