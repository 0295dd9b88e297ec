//! Observability for the ingestion service
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Ingestion counters
//!
//! Observability is read-only: it never changes the outcome of an ingestion.
//!
//! ```ignore
//! use dimension_ingest::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::SchemaResolved, &[("entity", "school")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{IngestMetrics, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(default_severity(event), event.as_str(), fields);
}

fn default_severity(event: Event) -> Severity {
    match event {
        Event::StorageCorruption => Severity::Fatal,
        Event::IngestFailed => Severity::Error,
        Event::IngestRejected | Event::SchemaNotFound | Event::ValidationFailed => Severity::Warn,
        _ => Severity::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_severities() {
        assert_eq!(default_severity(Event::StorageCorruption), Severity::Fatal);
        assert_eq!(default_severity(Event::IngestFailed), Severity::Error);
        assert_eq!(default_severity(Event::ValidationFailed), Severity::Warn);
        assert_eq!(default_severity(Event::BatchPersisted), Severity::Info);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("data_dir", "/tmp/test")]);
        log_event(Event::InitComplete);
    }
}
