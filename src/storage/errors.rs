//! Storage error types
//!
//! Error codes:
//! - INGEST_STORAGE_WRITE_FAILED
//! - INGEST_STORAGE_READ_FAILED
//! - INGEST_STORAGE_ENCODE_FAILED
//! - INGEST_DISPATCH_FAILED
//! - INGEST_DATA_CORRUPTION (FATAL)

use std::io;

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence failures. All of them propagate out of the pipeline.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context}: {source}")]
    WriteFailed {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    ReadFailed {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode batch: {0}")]
    EncodeFailed(String),

    /// The dispatcher refused the insert; the message is carried through untouched.
    #[error("{0}")]
    DispatchFailed(String),

    #[error("Data corruption at byte offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },
}

impl StorageError {
    pub fn write_failed(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::WriteFailed {
            context: context.into(),
            source,
        }
    }

    pub fn read_failed(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::ReadFailed {
            context: context.into(),
            source,
        }
    }

    pub fn dispatch_failed(message: impl Into<String>) -> Self {
        StorageError::DispatchFailed(message.into())
    }

    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        StorageError::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::WriteFailed { .. } => "INGEST_STORAGE_WRITE_FAILED",
            StorageError::ReadFailed { .. } => "INGEST_STORAGE_READ_FAILED",
            StorageError::EncodeFailed(_) => "INGEST_STORAGE_ENCODE_FAILED",
            StorageError::DispatchFailed(_) => "INGEST_DISPATCH_FAILED",
            StorageError::Corruption { .. } => "INGEST_DATA_CORRUPTION",
        }
    }

    /// Corruption halts the process; everything else fails one request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StorageError::Corruption { .. })
    }
}
