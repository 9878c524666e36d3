//! Shared keyed cache used for lease-based locking
//!
//! Only the atomic primitives the tree mutex needs are exposed: an
//! insert-if-absent that returns whatever value ends up stored, and delete.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lease cache errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum CacheError {
    /// Cache backend could not be reached
    #[error("Cache unavailable: {reason}")]
    Unavailable {
        /// Failure description
        reason: String,
    },

    /// Backend rejected the operation
    #[error("Cache operation failed: {reason}")]
    OperationFailed {
        /// Failure description
        reason: String,
    },
}

/// Atomic keyed cache with per-entry expiry.
#[async_trait]
pub trait LeaseCacheEffects: Send + Sync {
    /// Return the current value for `key`; if absent or expired, store
    /// `value` with the given time-to-live and return it.
    async fn get_or_set(&self, key: &str, value: &str, ttl: Duration)
        -> Result<String, CacheError>;

    /// Remove `key` unconditionally.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove `key` only while it still holds `owner`. Returns whether an
    /// entry was removed.
    ///
    /// Backends without compare-and-delete fall back to an unconditional
    /// delete.
    async fn delete_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError> {
        let _ = owner;
        self.delete(key).await?;
        Ok(true)
    }
}

/// Blanket implementation for Arc<T> where T: LeaseCacheEffects
#[async_trait]
impl<T: LeaseCacheEffects + ?Sized> LeaseCacheEffects for std::sync::Arc<T> {
    async fn get_or_set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<String, CacheError> {
        (**self).get_or_set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }

    async fn delete_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError> {
        (**self).delete_if_owner(key, owner).await
    }
}
