//! Ingestion decision pipeline
//!
//! Steps run in strict order and stop at the first failure:
//!
//! 1. Name check: a blank name is rejected before any lookup
//! 2. Schema resolution: one registry lookup, "not found" is a rejection
//! 3. Structural validation of the `{name, records}` envelope, all violations reported
//! 4. Persistence: exactly one dispatcher insert
//!
//! Rejections are returned as `IngestOutcome` values. Registry, schema and
//! dispatcher failures are returned as `IngestError` with their message intact.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{IngestError, IngestResult};
use super::request::IngestionRequest;
use super::result::IngestOutcome;
use crate::observability::{log_event_with_fields, Event, IngestMetrics};
use crate::schema::{SchemaAccessor, SchemaKind, SchemaRegistry};
use crate::storage::PersistenceDispatcher;
use crate::validation::CompiledSchema;

/// Request-scoped ingestion over an explicit registry and dispatcher.
///
/// Holds no per-request state; one pipeline can serve concurrent callers.
pub struct IngestionPipeline<R, D> {
    accessor: SchemaAccessor<R>,
    dispatcher: D,
    kind: SchemaKind,
    metrics: Arc<IngestMetrics>,
}

impl<R: SchemaRegistry, D: PersistenceDispatcher> IngestionPipeline<R, D> {
    /// Creates a dimension pipeline.
    pub fn new(registry: R, dispatcher: D) -> Self {
        Self {
            accessor: SchemaAccessor::new(registry),
            dispatcher,
            kind: SchemaKind::Dimension,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Switches the ingestion kind (envelope keys, registry column, messages).
    pub fn with_kind(mut self, kind: SchemaKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shares counters with the caller.
    pub fn with_metrics(mut self, metrics: Arc<IngestMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn registry(&self) -> &R {
        self.accessor.registry()
    }

    /// Runs the pipeline for one request.
    pub fn ingest(&self, request: &IngestionRequest) -> IngestResult<IngestOutcome> {
        self.ingest_records(&request.entity_name, &request.records, request.tracking_id)
    }

    /// Runs the pipeline for `records` under `entity_name`.
    ///
    /// # Returns
    ///
    /// - `Ok(outcome)` for every accepted or rejected batch
    /// - `Err` if the registry, the schema or the dispatcher failed
    pub fn ingest_records(
        &self,
        entity_name: &str,
        records: &[Value],
        tracking_id: i64,
    ) -> IngestResult<IngestOutcome> {
        self.metrics.increment_received();
        let record_count = records.len().to_string();
        let tracking = tracking_id.to_string();
        log_event_with_fields(
            Event::IngestReceived,
            &[
                ("entity", entity_name),
                ("kind", self.kind.as_str()),
                ("records", record_count.as_str()),
                ("tracking_id", tracking.as_str()),
            ],
        );

        if entity_name.trim().is_empty() {
            self.metrics.increment_missing_name();
            log_event_with_fields(
                Event::IngestRejected,
                &[("reason", "name_missing"), ("tracking_id", tracking.as_str())],
            );
            return Ok(IngestOutcome::name_missing(self.kind));
        }

        let descriptor = match self.accessor.resolve(self.kind, entity_name) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                self.metrics.increment_not_found();
                log_event_with_fields(Event::SchemaNotFound, &[("entity", entity_name)]);
                return Ok(IngestOutcome::not_found(self.kind));
            }
            Err(e) => return Err(self.fail(entity_name, e)),
        };
        log_event_with_fields(Event::SchemaResolved, &[("entity", entity_name)]);

        let compiled =
            CompiledSchema::compile(&descriptor.schema).map_err(|e| self.fail(entity_name, e))?;
        let violations = compiled.validate(&self.kind.envelope(entity_name, records));
        if !violations.is_empty() {
            self.metrics.record_invalid(violations.len());
            let count = violations.len().to_string();
            log_event_with_fields(
                Event::ValidationFailed,
                &[("entity", entity_name), ("violations", count.as_str())],
            );
            return Ok(IngestOutcome::invalid(violations));
        }

        self.dispatcher
            .insert(entity_name, records, tracking_id)
            .map_err(|e| self.fail(entity_name, e))?;

        self.metrics.record_accepted(records.len());
        log_event_with_fields(
            Event::BatchPersisted,
            &[
                ("entity", entity_name),
                ("records", record_count.as_str()),
                ("tracking_id", tracking.as_str()),
            ],
        );
        Ok(IngestOutcome::added(self.kind))
    }

    fn fail(&self, entity_name: &str, error: impl Into<IngestError>) -> IngestError {
        let error = error.into();
        self.metrics.increment_infrastructure_failures();
        let message = error.to_string();
        let event = if error.is_fatal() {
            Event::StorageCorruption
        } else {
            Event::IngestFailed
        };
        log_event_with_fields(
            event,
            &[
                ("code", error.code()),
                ("entity", entity_name),
                ("error", message.as_str()),
            ],
        );
        error
    }
}

impl<R, D> std::fmt::Debug for IngestionPipeline<R, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("kind", &self.kind)
            .finish()
    }
}
