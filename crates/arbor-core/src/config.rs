//! Arbor configuration
//!
//! Loaded from TOML. Every section has defaults, so an absent file or an
//! empty section is valid.

use crate::errors::{ArborError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArborConfig {
    /// Tree mutex settings
    pub lock: LockConfig,
    /// Repair engine settings
    pub repair: RepairConfig,
    /// Node store settings
    pub store: StoreConfig,
}

/// Tree mutex settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Protected resource name; each resource gets its own lock key
    pub resource: String,
    /// How long a holder keeps the lease without releasing it
    pub lease_secs: u64,
    /// Delay between acquisition attempts
    pub poll_interval_ms: u64,
    /// Upper bound on how long a waiter keeps polling
    pub acquire_timeout_secs: u64,
    /// Directory holding lease files for the file-backed lease cache
    pub lease_dir: PathBuf,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            resource: "page-tree".to_string(),
            lease_secs: 30,
            poll_interval_ms: 100,
            acquire_timeout_secs: 60,
            lease_dir: PathBuf::from(".arbor/leases"),
        }
    }
}

impl LockConfig {
    /// Lease duration
    pub fn lease(&self) -> Duration {
        Duration::from_secs(self.lease_secs)
    }

    /// Poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Acquisition deadline
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Repair engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Reject forests deeper than this
    pub max_depth: Option<u32>,
}

/// Node store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON forest snapshot used by the file store
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("forest.json"),
        }
    }
}

impl ArborConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            ArborError::invalid(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&source)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.lock.resource.trim().is_empty() {
            return Err(ArborError::invalid("lock.resource must not be empty"));
        }
        if self.lock.lease_secs == 0 {
            return Err(ArborError::invalid("lock.lease_secs must be positive"));
        }
        if self.lock.poll_interval_ms == 0 {
            return Err(ArborError::invalid("lock.poll_interval_ms must be positive"));
        }
        if self.lock.acquire_timeout() < self.lock.poll_interval() {
            return Err(ArborError::invalid(
                "lock.acquire_timeout_secs must cover at least one poll interval",
            ));
        }
        if self.repair.max_depth == Some(0) {
            return Err(ArborError::invalid("repair.max_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ArborConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lock.lease(), Duration::from_secs(30));
        assert_eq!(config.lock.resource, "page-tree");
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = ArborConfig::from_toml_str(
            r#"
            [lock]
            resource = "media-tree"

            [repair]
            max_depth = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.lock.resource, "media-tree");
        assert_eq!(config.lock.poll_interval_ms, 100);
        assert_eq!(config.repair.max_depth, Some(64));
        assert_eq!(config.store.path, PathBuf::from("forest.json"));
    }

    #[test]
    fn test_rejects_zero_lease() {
        let err = ArborConfig::from_toml_str("[lock]\nlease_secs = 0\n").unwrap_err();
        assert!(matches!(err, ArborError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_timeout_shorter_than_poll() {
        let err = ArborConfig::from_toml_str(
            "[lock]\npoll_interval_ms = 5000\nacquire_timeout_secs = 1\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("acquire_timeout_secs"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArborConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ArborConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbor.toml");
        std::fs::write(&path, "[store]\npath = \"/var/lib/arbor/forest.json\"\n").unwrap();

        let config = ArborConfig::load(&path).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/var/lib/arbor/forest.json"));
    }
}
