//! Infrastructure errors raised by the ingestion pipeline
//!
//! Expected rejections are `IngestOutcome::Failure` values, never errors.
//! Everything here is an infrastructure failure that the caller maps to a
//! 500-class response. Wrapped errors keep their original message.

use thiserror::Error;

use crate::schema::RegistryError;
use crate::storage::StorageError;
use crate::validation::ValidatorError;

/// Result type for pipeline operations
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Registry lookup failed or returned an undecodable row
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The registered schema cannot be compiled
    #[error(transparent)]
    Schema(#[from] ValidatorError),

    /// The persistence dispatcher failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IngestError {
    /// Returns the stable code of the wrapped error
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Registry(e) => e.code(),
            IngestError::Schema(e) => e.code(),
            IngestError::Storage(e) => e.code(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            IngestError::Storage(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// HTTP-style status for callers that map errors to responses
    pub fn status_code(&self) -> u16 {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_message() {
        let err: IngestError = StorageError::dispatch_failed("exception test").into();
        assert_eq!(err.to_string(), "exception test");
        assert_eq!(err.code(), "INGEST_DISPATCH_FAILED");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_registry_error_wrapped() {
        let err: IngestError = RegistryError::lookup_failed("connection refused").into();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.code(), "INGEST_REGISTRY_LOOKUP_FAILED");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err: IngestError = StorageError::corruption_at_offset(0, "bad checksum").into();
        assert!(err.is_fatal());
    }
}
