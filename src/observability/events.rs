//! Observable events for the ingestion service
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// Batch log opened
    StorageOpened,
    /// Data directory initialized
    InitComplete,

    // Ingestion
    /// Ingestion request received
    IngestReceived,
    /// Request rejected before schema lookup
    IngestRejected,
    /// Schema resolved from the registry
    SchemaResolved,
    /// Registry has no schema for the entity
    SchemaNotFound,
    /// Records violate the resolved schema
    ValidationFailed,
    /// Batch handed to the persistence dispatcher and stored
    BatchPersisted,
    /// Registry or dispatcher failure
    IngestFailed,

    // Storage
    /// Checksum or framing failure in the batch log (FATAL)
    StorageCorruption,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StorageOpened => "STORAGE_OPENED",
            Event::InitComplete => "INIT_COMPLETE",

            Event::IngestReceived => "INGEST_RECEIVED",
            Event::IngestRejected => "INGEST_REJECTED",
            Event::SchemaResolved => "SCHEMA_RESOLVED",
            Event::SchemaNotFound => "SCHEMA_NOT_FOUND",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::BatchPersisted => "BATCH_PERSISTED",
            Event::IngestFailed => "INGEST_FAILED",

            Event::StorageCorruption => "STORAGE_CORRUPTION",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StorageCorruption)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::StorageOpened,
            Event::InitComplete,
            Event::IngestReceived,
            Event::IngestRejected,
            Event::SchemaResolved,
            Event::SchemaNotFound,
            Event::ValidationFailed,
            Event::BatchPersisted,
            Event::IngestFailed,
            Event::StorageCorruption,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::StorageCorruption.is_fatal());
        assert!(!Event::IngestFailed.is_fatal());
        assert!(!Event::ValidationFailed.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::BatchPersisted), "BATCH_PERSISTED");
    }
}
