//! Engine, store and configuration errors.

use thiserror::Error;

use rollcall_core::CoreError;

/// Failures reported by a [`Store`](crate::store::Store) implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be decoded.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// Any other store failure.
    #[error("{0}")]
    Other(String),
}

/// Errors returned by the engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The store failed while reading.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// The filter was rejected before any work was dispatched.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A task breaks a structural invariant.
    #[error("invalid task '{id}': {reason}")]
    InvalidTask { id: String, reason: String },

    /// A status label outside the known vocabulary.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// A matcher worker panicked or was aborted.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl EngineError {
    /// Shorthand for a missing version.
    pub fn version_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "version",
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFilter(msg) => Self::InvalidFilter(msg),
            CoreError::InvalidTask { id, reason } => Self::InvalidTask { id, reason },
            CoreError::UnknownStatus(label) => Self::UnknownStatus(label),
        }
    }
}

/// Errors loading configuration or snapshot files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            EngineError::version_not_found("v1").to_string(),
            "version not found: v1"
        );
        assert_eq!(
            EngineError::from(StoreError::Unavailable("timeout".into())).to_string(),
            "persistence error: store unavailable: timeout"
        );
    }

    #[test]
    fn test_core_filter_error_maps_to_invalid_filter() {
        let err = EngineError::from(CoreError::InvalidFilter("bad".into()));
        assert!(matches!(err, EngineError::InvalidFilter(msg) if msg == "bad"));
    }

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err = EngineError::from(CoreError::InvalidTask {
            id: "t1".into(),
            reason: "broken".into(),
        });
        assert!(matches!(err, EngineError::InvalidTask { ref id, .. } if id == "t1"));
        assert_eq!(err.to_string(), "invalid task 't1': broken");

        let err = EngineError::from(CoreError::UnknownStatus("running".into()));
        assert!(matches!(err, EngineError::UnknownStatus(label) if label == "running"));
    }
}
