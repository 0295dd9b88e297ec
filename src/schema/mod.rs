//! Schema registry access
//!
//! Resolves a named entity to its currently active structural schema with a
//! single lookup against an external store.
//!
//! # Design Principles
//!
//! - "Not found" is a normal outcome (`Ok(None)`), distinct from a failed lookup
//! - Descriptors are fetched per request and never cached here
//! - Schemas are data, passed explicitly to the validator

mod directory;
mod errors;
mod registry;
mod types;

pub use directory::DirectorySchemaRegistry;
pub use errors::{RegistryError, RegistryResult};
pub use registry::{MemorySchemaRegistry, SchemaAccessor, SchemaRegistry};
pub use types::{SchemaDescriptor, SchemaKind};
