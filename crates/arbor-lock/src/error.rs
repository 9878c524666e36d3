//! Tree mutex errors

use arbor_core::effects::CacheError;
use arbor_core::ArborError;
use thiserror::Error;

/// Failures acquiring or releasing the tree mutex
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Another holder kept the lease past the acquisition deadline
    #[error("Timed out after {waited_ms}ms waiting for lock {key} (held by {holder})")]
    Timeout {
        /// Contended key
        key: String,
        /// Time spent polling
        waited_ms: u64,
        /// Token observed on the last attempt
        holder: String,
    },

    /// The lease cache failed
    #[error("Lease cache failed for lock {key}: {source}")]
    Cache {
        /// Key being operated on
        key: String,
        /// Underlying cache error
        #[source]
        source: CacheError,
    },
}

impl From<LockError> for ArborError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { .. } => ArborError::timeout(err.to_string()),
            LockError::Cache { .. } => ArborError::cache(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_stays_typed_through_arbor_error() {
        let err = LockError::Timeout {
            key: "arbor:tree-mutex:page-tree".into(),
            waited_ms: 250,
            holder: "abc".into(),
        };
        let converted = ArborError::from(err.clone());
        assert_eq!(converted, ArborError::timeout(err.to_string()));
    }

    #[test]
    fn test_cache_failure_maps_to_cache() {
        let err = LockError::Cache {
            key: "k".into(),
            source: CacheError::Unavailable {
                reason: "down".into(),
            },
        };
        assert!(matches!(ArborError::from(err), ArborError::Cache { .. }));
    }
}
