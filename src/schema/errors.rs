//! Schema registry error types
//!
//! "Not found" is not an error: lookups return `Ok(None)` for it. Everything
//! here is an infrastructure failure and propagates to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry failures
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The external store failed; the message is carried through untouched.
    #[error("{0}")]
    LookupFailed(String),

    #[error("Failed to read registry entry '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed registry entry for '{entity}': {reason}")]
    MalformedEntry { entity: String, reason: String },
}

impl RegistryError {
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        RegistryError::LookupFailed(message.into())
    }

    pub fn malformed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::MalformedEntry {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::LookupFailed(_) => "INGEST_REGISTRY_LOOKUP_FAILED",
            RegistryError::Io { .. } => "INGEST_REGISTRY_IO_ERROR",
            RegistryError::MalformedEntry { .. } => "INGEST_REGISTRY_MALFORMED_ENTRY",
        }
    }
}
