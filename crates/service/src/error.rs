//! Typed error enum for the service layer.
//!
//! Unifies validation and storage failures into a single error type so
//! transport adapters can match on failure kind instead of downcasting
//! opaque boxes. Each kind maps to a different user-facing message.

use book_catalog_core::ValidationError;
use book_catalog_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying validation and storage failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input rejected before any store access.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Storage operation failed (DB, not found, negative bucket, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }

    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }

    /// Whether this error represents a rejected request, as opposed to a
    /// store-side failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
