//! Unified error system for Arbor core
//!
//! Domain crates keep their own precise error enums; anything crossing a
//! crate boundary without a more specific home collapses into `ArborError`.

use crate::effects::{CacheError, StoreError};
use serde::{Deserialize, Serialize};

/// Unified error type for Arbor operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ArborError {
    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// What was invalid
        message: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Node store failure
    #[error("Storage error: {message}")]
    Storage {
        /// Storage failure description
        message: String,
    },

    /// Lease cache failure
    #[error("Cache error: {message}")]
    Cache {
        /// Cache failure description
        message: String,
    },

    /// Timed out waiting for a shared resource
    #[error("Timeout: {message}")]
    Timeout {
        /// What was waited on
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serialization failure description
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Internal failure description
        message: String,
    },
}

impl ArborError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Arbor operations
pub type Result<T> = std::result::Result<T, ArborError>;

impl From<StoreError> for ArborError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::not_found(err.to_string()),
            _ => Self::storage(err.to_string()),
        }
    }
}

impl From<CacheError> for ArborError {
    fn from(err: CacheError) -> Self {
        Self::cache(err.to_string())
    }
}

impl From<std::io::Error> for ArborError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ArborError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ArborError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    #[test]
    fn test_error_creation() {
        let err = ArborError::invalid("test message");
        assert!(matches!(err, ArborError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_store_error_conversion() {
        let missing = ArborError::from(StoreError::NotFound(NodeId(9)));
        assert!(matches!(missing, ArborError::NotFound { .. }));

        let backend = ArborError::from(StoreError::Backend {
            reason: "disk full".into(),
        });
        assert!(matches!(backend, ArborError::Storage { .. }));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        assert!(matches!(ArborError::from(io_err), ArborError::NotFound { .. }));
    }

    #[test]
    fn test_timeout_is_distinct() {
        let err = ArborError::timeout("lock arbor:tree-mutex:page-tree");
        assert!(matches!(err, ArborError::Timeout { .. }));
        assert_eq!(err.to_string(), "Timeout: lock arbor:tree-mutex:page-tree");
    }
}
