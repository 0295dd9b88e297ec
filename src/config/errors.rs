//! Configuration errors
//!
//! All configuration errors are fatal at startup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "INGEST_CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "INGEST_CONFIG_PARSE_FAILED",
            ConfigError::Invalid(_) => "INGEST_CONFIG_INVALID",
        }
    }
}
