//! Lease-based tree mutex with scoped release

use crate::error::LockError;
use arbor_core::effects::LeaseCacheEffects;
use arbor_core::LockConfig;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Cache key guarding one protected resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey(String);

impl LockKey {
    /// Key for a resource type such as `"page-tree"`
    pub fn for_resource(resource: &str) -> Self {
        Self(format!("arbor:tree-mutex:{resource}"))
    }

    /// Cache key string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutexSettings {
    /// Lease granted to a holder
    pub lease: Duration,
    /// Delay between attempts
    pub poll_interval: Duration,
    /// Give up waiting after this long
    pub acquire_timeout: Duration,
}

impl Default for MutexSettings {
    fn default() -> Self {
        Self {
            lease: Duration::from_secs(30),
            poll_interval: Duration::from_millis(100),
            acquire_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&LockConfig> for MutexSettings {
    fn from(config: &LockConfig) -> Self {
        Self {
            lease: config.lease(),
            poll_interval: config.poll_interval(),
            acquire_timeout: config.acquire_timeout(),
        }
    }
}

/// Advisory mutex over one protected resource.
///
/// Only callers that go through the same key on the same cache exclude each
/// other; unwrapped writers are not stopped.
#[derive(Clone)]
pub struct TreeMutex {
    cache: Arc<dyn LeaseCacheEffects>,
    key: LockKey,
    settings: MutexSettings,
}

impl fmt::Debug for TreeMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeMutex")
            .field("key", &self.key)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TreeMutex {
    /// Create a mutex for `key`
    pub fn new(cache: Arc<dyn LeaseCacheEffects>, key: LockKey, settings: MutexSettings) -> Self {
        Self {
            cache,
            key,
            settings,
        }
    }

    /// Create a mutex from the `[lock]` config section
    pub fn from_config(cache: Arc<dyn LeaseCacheEffects>, config: &LockConfig) -> Self {
        Self::new(
            cache,
            LockKey::for_resource(&config.resource),
            MutexSettings::from(config),
        )
    }

    /// Guarded key
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    /// Timing parameters
    pub fn settings(&self) -> MutexSettings {
        self.settings
    }

    async fn attempt(&self, token: &str) -> Result<String, LockError> {
        self.cache
            .get_or_set(self.key.as_str(), token, self.settings.lease)
            .await
            .map_err(|source| LockError::Cache {
                key: self.key.to_string(),
                source,
            })
    }

    fn guard(&self, token: String) -> TreeMutexGuard {
        TreeMutexGuard {
            cache: Arc::clone(&self.cache),
            key: self.key.to_string(),
            token,
            released: false,
        }
    }

    /// Single acquisition attempt.
    pub async fn try_acquire(&self) -> Result<Option<TreeMutexGuard>, LockError> {
        let token = Uuid::new_v4().to_string();
        let holder = self.attempt(&token).await?;
        if holder == token {
            tracing::debug!(key = %self.key, "tree mutex acquired");
            Ok(Some(self.guard(token)))
        } else {
            Ok(None)
        }
    }

    /// Poll until the lease is ours or `acquire_timeout` elapses.
    pub async fn acquire(&self) -> Result<TreeMutexGuard, LockError> {
        let token = Uuid::new_v4().to_string();
        let started = Instant::now();
        let deadline = started + self.settings.acquire_timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let holder = self.attempt(&token).await?;
            if holder == token {
                tracing::debug!(key = %self.key, attempts, "tree mutex acquired");
                return Ok(self.guard(token));
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(key = %self.key, %holder, attempts, "tree mutex acquisition timed out");
                return Err(LockError::Timeout {
                    key: self.key.to_string(),
                    waited_ms: now.duration_since(started).as_millis() as u64,
                    holder,
                });
            }

            tracing::trace!(key = %self.key, %holder, "tree mutex contended");
            tokio::time::sleep(self.settings.poll_interval.min(deadline - now)).await;
        }
    }

    /// Run `op` while holding the mutex.
    ///
    /// The lease is released after `op` finishes, whether it returns `Ok`,
    /// returns `Err`, or panics; a panic is resumed after release.
    pub async fn run<F, Fut, T, E>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let guard = self.acquire().await?;
        let outcome = AssertUnwindSafe(op()).catch_unwind().await;

        if let Err(err) = guard.release().await {
            tracing::warn!(error = %err, "tree mutex release failed, lease will expire");
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Proof of holding the tree mutex.
///
/// Call `release` when done. Dropping an unreleased guard schedules the
/// release on the current tokio runtime; outside a runtime the lease is
/// left to expire.
#[must_use = "dropping the guard releases the tree mutex"]
pub struct TreeMutexGuard {
    cache: Arc<dyn LeaseCacheEffects>,
    key: String,
    token: String,
    released: bool,
}

impl fmt::Debug for TreeMutexGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeMutexGuard")
            .field("key", &self.key)
            .field("token", &self.token)
            .field("released", &self.released)
            .finish()
    }
}

impl TreeMutexGuard {
    /// Token stored under the key while this guard holds it
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Release the lease if it is still ours.
    ///
    /// If this future is dropped before the delete completes, `Drop` still
    /// schedules the release.
    pub async fn release(mut self) -> Result<(), LockError> {
        let result = self.cache.delete_if_owner(&self.key, &self.token).await;
        self.released = true;
        let removed = result.map_err(|source| LockError::Cache {
            key: self.key.clone(),
            source,
        })?;
        if removed {
            tracing::debug!(key = %self.key, "tree mutex released");
        } else {
            tracing::warn!(key = %self.key, "tree mutex lease expired before release");
        }
        Ok(())
    }
}

impl Drop for TreeMutexGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let cache = Arc::clone(&self.cache);
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = cache.delete_if_owner(&key, &token).await {
                        tracing::warn!(%key, error = %err, "deferred tree mutex release failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(%key, "tree mutex guard dropped outside a runtime, lease will expire");
            }
        }
    }
}
