//! Ingestion decision pipeline
//!
//! Turns a named batch of records into exactly one outcome: accepted and
//! persisted, or rejected with a reason. Infrastructure failures are not
//! outcomes; they are returned as errors for the caller to surface.
//!
//! # Design Principles
//!
//! - Cheapest checks first (name, then lookup, then validation, then persistence)
//! - The full violation list is returned, never just the first
//! - No partial success: nothing is persisted unless every record passes
//! - Collaborators are passed in explicitly

mod errors;
mod pipeline;
mod request;
mod result;

pub use errors::{IngestError, IngestResult};
pub use pipeline::IngestionPipeline;
pub use request::IngestionRequest;
pub use result::{FailureDetail, IngestOutcome, STATUS_BAD_REQUEST, STATUS_OK};
