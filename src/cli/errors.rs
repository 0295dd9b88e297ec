//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::schema::RegistryError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid request JSON: {0}")]
    InvalidRequest(String),

    #[error("Data directory already initialized")]
    AlreadyInitialized,

    #[error("Data directory not initialized. Run 'dimension-ingest init' first.")]
    NotInitialized,
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Registry(e) => e.code(),
            CliError::Storage(e) => e.code(),
            CliError::Ingest(e) => e.code(),
            CliError::Io(_) => "INGEST_CLI_IO_ERROR",
            CliError::InvalidRequest(_) => "INGEST_CLI_INVALID_REQUEST",
            CliError::AlreadyInitialized => "INGEST_CLI_ALREADY_INITIALIZED",
            CliError::NotInitialized => "INGEST_CLI_NOT_INITIALIZED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            CliError::Storage(e) => e.is_fatal(),
            CliError::Ingest(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidRequest(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_codes() {
        let err: CliError = StorageError::dispatch_failed("exception test").into();
        assert_eq!(err.code(), "INGEST_DISPATCH_FAILED");
        assert_eq!(err.to_string(), "exception test");

        assert_eq!(CliError::NotInitialized.code(), "INGEST_CLI_NOT_INITIALIZED");
    }

    #[test]
    fn test_json_error_is_invalid_request() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = parse_err.into();
        assert_eq!(err.code(), "INGEST_CLI_INVALID_REQUEST");
    }
}
