//! Layer 2: Tree Mutex
//!
//! Serializes structural mutations of a forest across every worker that
//! shares a lease cache. The protocol is a polling lease:
//!
//! 1. generate a unique token
//! 2. `get_or_set(key, token, lease)` against the shared cache
//! 3. if the returned value is our token we hold the lock
//! 4. otherwise sleep one poll interval and retry, until the deadline
//!
//! Acquisition yields a `TreeMutexGuard`; `TreeMutex::run` releases it on
//! every exit path including panics. Waiters are not queued, so there is no
//! fairness guarantee under sustained contention.

#![forbid(unsafe_code)]

pub mod error;
pub mod mutex;

pub use error::LockError;
pub use mutex::{LockKey, MutexSettings, TreeMutex, TreeMutexGuard};
