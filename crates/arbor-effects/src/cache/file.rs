//! File-backed lease cache handler
//!
//! Each key maps to one lease file under a directory, guarded by a sibling
//! lock file. Every read-check-replace and compare-and-delete runs while
//! holding `flock(LOCK_EX)` on that lock file, and lease records are written
//! to a unique temp file then renamed into place, so no reader ever sees a
//! half-written lease. Expiry is wall-clock based because holders may live in
//! different processes.

use crate::lockfile::{lock_exclusive, temp_sibling};
use arbor_core::effects::{CacheError, LeaseCacheEffects};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize)]
struct LeaseRecord {
    value: String,
    expires_at_ms: u64,
}

/// Lease cache storing one file per key
#[derive(Debug, Clone)]
pub struct FileLeaseCache {
    dir: PathBuf,
}

/// Lease and lock file for one key
#[derive(Debug, Clone)]
struct KeyPaths {
    lease: PathBuf,
    lock: PathBuf,
}

impl FileLeaseCache {
    /// Cache rooted at `dir`; created on first use
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Lease directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_paths(&self, key: &str) -> KeyPaths {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        KeyPaths {
            lease: self.dir.join(format!("{file_name}.lease")),
            lock: self.dir.join(format!("{file_name}.lock")),
        }
    }

    /// Run `op` on the blocking pool while holding the key's lock.
    async fn with_key_locked<T, F>(&self, key: &str, op: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&KeyPaths) -> Result<T, CacheError> + Send + 'static,
    {
        let dir = self.dir.clone();
        let paths = self.key_paths(key);
        tokio::task::spawn_blocking(move || {
            fs::create_dir_all(&dir).map_err(|e| unavailable(&dir, e))?;
            let _lock = lock_exclusive(&paths.lock).map_err(|e| unavailable(&paths.lock, e))?;
            op(&paths)
        })
        .await
        .map_err(|e| CacheError::OperationFailed {
            reason: format!("lease task for {key} failed: {e}"),
        })?
    }
}

/// Current record, or `None` when absent or unreadable.
fn read_record(path: &Path) -> Result<Option<LeaseRecord>, CacheError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents).ok()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(unavailable(path, e)),
    }
}

fn write_record(path: &Path, record: &LeaseRecord) -> Result<(), CacheError> {
    let contents = serde_json::to_vec(record).map_err(|e| CacheError::OperationFailed {
        reason: format!("Failed to encode lease: {}", e),
    })?;
    let temp = temp_sibling(path);
    fs::write(&temp, contents).map_err(|e| unavailable(&temp, e))?;
    fs::rename(&temp, path).map_err(|e| {
        let _ = fs::remove_file(&temp);
        unavailable(path, e)
    })
}

fn remove_record(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(unavailable(path, e)),
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Unavailable {
        reason: format!("{}: {}", path.display(), err),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[async_trait]
impl LeaseCacheEffects for FileLeaseCache {
    async fn get_or_set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<String, CacheError> {
        let value = value.to_string();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self.with_key_locked(key, move |paths| {
            let now = now_ms();
            if let Some(current) = read_record(&paths.lease)? {
                if current.expires_at_ms > now {
                    return Ok(current.value);
                }
            }
            let record = LeaseRecord {
                value,
                expires_at_ms: now.saturating_add(ttl_ms),
            };
            write_record(&paths.lease, &record)?;
            Ok(record.value)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.with_key_locked(key, |paths| remove_record(&paths.lease))
            .await
    }

    async fn delete_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError> {
        let owner = owner.to_string();
        self.with_key_locked(key, move |paths| match read_record(&paths.lease)? {
            Some(record) if record.value == owner => {
                remove_record(&paths.lease)?;
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_claim_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLeaseCache::new(dir.path().join("leases"));
        let ttl = Duration::from_secs(30);

        assert_eq!(cache.get_or_set("arbor:page", "a", ttl).await.unwrap(), "a");
        assert_eq!(cache.get_or_set("arbor:page", "b", ttl).await.unwrap(), "a");
        assert!(dir.path().join("leases").join("arbor_page.lease").exists());
        assert!(dir.path().join("leases").join("arbor_page.lock").exists());
    }

    #[tokio::test]
    async fn test_expired_lease_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLeaseCache::new(dir.path());

        cache.get_or_set("k", "a", Duration::ZERO).await.unwrap();
        assert_eq!(
            cache
                .get_or_set("k", "b", Duration::from_secs(30))
                .await
                .unwrap(),
            "b"
        );
    }

    #[tokio::test]
    async fn test_delete_if_owner_only_removes_own_lease() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLeaseCache::new(dir.path());
        cache
            .get_or_set("k", "a", Duration::from_secs(30))
            .await
            .unwrap();

        assert!(!cache.delete_if_owner("k", "b").await.unwrap());
        assert!(cache.delete_if_owner("k", "a").await.unwrap());
        assert!(!cache.delete_if_owner("k", "a").await.unwrap());
        cache.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_lease_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLeaseCache::new(dir.path());
        std::fs::write(dir.path().join("k.lease"), b"").unwrap();

        let ttl = Duration::from_secs(30);
        assert_eq!(cache.get_or_set("k", "a", ttl).await.unwrap(), "a");
        assert_eq!(cache.get_or_set("k", "b", ttl).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_claim_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileLeaseCache::new(dir.path());
        cache.get_or_set("k", "a", Duration::ZERO).await.unwrap();
        cache
            .get_or_set("k", "b", Duration::from_secs(30))
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["k.lease", "k.lock"]);
    }
}
