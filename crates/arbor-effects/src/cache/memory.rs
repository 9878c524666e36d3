//! In-memory lease cache handler
//!
//! Shared by every task holding the same `Arc`, which makes it the
//! process-local equivalent of a networked cache. Expiry is measured with
//! tokio's clock so paused-time tests can fast-forward leases.

use arbor_core::effects::{CacheError, LeaseCacheEffects};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory lease cache
#[derive(Debug, Default)]
pub struct MemoryLeaseCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLeaseCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Live value for `key`, if any
    pub fn peek(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }
}

#[async_trait]
impl LeaseCacheEffects for MemoryLeaseCache {
    async fn get_or_set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<String, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return Ok(entry.value.clone());
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(value.to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn delete_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.value == owner => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
