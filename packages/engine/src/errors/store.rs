//! Storage-level error type.
//!
//! These errors describe failures of the document store itself and carry no
//! business meaning. Services convert them into `DomainError` via the provided
//! `From<StoreError> for DomainError` implementation, after deciding whether
//! the failure is worth a retry.

use thiserror::Error;

use crate::domain::user::{ShortCode, UserId};

/// Failures reported by a document store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A commit expectation did not hold because the record moved on.
    #[error("record {id} was modified concurrently (expected revision {expected}, found {found})")]
    RevisionMismatch {
        id: UserId,
        expected: u64,
        found: u64,
    },

    /// A commit expectation named a record that does not exist.
    #[error("record {id} is missing")]
    Missing { id: UserId },

    /// Create was called for an id that is already present.
    #[error("record {id} already exists")]
    AlreadyExists { id: UserId },

    /// Create was called with a short code another record already holds.
    #[error("short code {code} is already taken")]
    CodeTaken { code: ShortCode },

    /// The store could not be reached or refused the operation.
    #[error("store unavailable: {detail}")]
    Unavailable { detail: String },

    /// The store did not answer in time.
    #[error("store operation timed out after {waited_ms}ms")]
    Timeout { waited_ms: u64 },
}

impl StoreError {
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable {
            detail: detail.into(),
        }
    }

    /// Whether a retry with backoff has a chance of succeeding.
    ///
    /// Revision conflicts are excluded on purpose: they need a fresh read and
    /// re-evaluation, not a blind resubmit of the same batch.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
