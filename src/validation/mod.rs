//! Structural validation of candidate documents
//!
//! Schemas are registry data, never compiled-in types. The validator is a pure
//! function over `(schema, document)` that returns the complete, ordered list
//! of violations, all produced by one compiled `jsonschema` validator.
//!
//! # Guarantees
//!
//! - Every missing required property is reported, per object and per record
//! - No early exit across records or properties
//! - A document is valid exactly when the compiled schema accepts it
//! - Same schema + same document = same violation list
//! - Documents are never mutated, coerced or defaulted

mod errors;
pub mod pointer;
mod validator;
mod violation;

pub use errors::{ValidatorError, ValidatorResult};
pub use validator::{validate, CompiledSchema};
pub use violation::ValidationViolation;
