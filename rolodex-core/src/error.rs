//! Store error types

use thiserror::Error;

use crate::field::ContactField;

/// Errors raised by a contact store.
///
/// Missing records are not errors at this layer: lookups and mutations
/// return `Ok(None)` and the caller decides how to surface the absence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique field (email or phone) collides with another record.
    #[error("A contact with {field} '{value}' already exists")]
    Duplicate { field: ContactField, value: String },

    /// A write-path contract check failed.
    #[error("Contact validation failed: {field} {reason}")]
    Invalid { field: ContactField, reason: String },

    /// The backing store failed (connection, query, serialization).
    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn duplicate(field: ContactField, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field,
            value: value.into(),
        }
    }

    pub fn required(field: ContactField) -> Self {
        Self::Invalid {
            field,
            reason: "is required".to_string(),
        }
    }

    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
