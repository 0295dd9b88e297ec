//! dimension_ingest - schema-validated ingestion of named record batches
//!
//! A request names an entity and carries its records. The entity's schema is
//! looked up in a registry, the records are validated against it, and
//! accepted batches are handed to a persistence dispatcher.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod validation;
