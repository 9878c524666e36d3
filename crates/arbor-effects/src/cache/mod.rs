//! Lease cache handlers

mod file;
mod memory;

pub use file::FileLeaseCache;
pub use memory::MemoryLeaseCache;
