//! Validator error types
//!
//! A schema that cannot be compiled is an infrastructure problem (the registry
//! served something unusable), never a user-input rejection.

use thiserror::Error;

/// Result type for schema compilation
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Schema compilation failures
#[derive(Debug, Clone, Error)]
pub enum ValidatorError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

impl ValidatorError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidatorError::InvalidSchema(_) => "INGEST_SCHEMA_INVALID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_message() {
        let err = ValidatorError::InvalidSchema("type must be a string".into());
        assert_eq!(err.code(), "INGEST_SCHEMA_INVALID");
        assert_eq!(err.to_string(), "Invalid schema: type must be a string");
    }
}
