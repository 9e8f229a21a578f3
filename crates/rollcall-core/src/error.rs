//! Core domain errors.

use thiserror::Error;

/// Core domain errors for rollcall.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A task filter is malformed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A task violates a structural invariant.
    #[error("Invalid task '{id}': {reason}")]
    InvalidTask { id: String, reason: String },

    /// A status label is not part of the known vocabulary.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}
