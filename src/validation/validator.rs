//! Structural validator over registry-supplied JSON Schemas
//!
//! Schemas arrive as data at request time, so validation is a pure function of
//! `(schema, document)`. `jsonschema` compiles the schema once per run and
//! enumerates every error. Each error is then translated into the wire dialect
//! loaders already parse: `instancePath`, `schemaPath`, `keyword`, `params`,
//! `message`.
//!
//! The engine visits keywords and properties in key order, `required` in schema
//! order and array items in index order, so the list is identical across runs.
//!
//! An object missing required properties reports only those. Every other
//! violation at or below that object is dropped.

use std::collections::BTreeSet;
use std::fmt;

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{JSONSchema, ValidationError};
use serde_json::{json, Map, Value};

use super::errors::{ValidatorError, ValidatorResult};
use super::pointer;
use super::violation::ValidationViolation;

/// A schema prepared for repeated validation.
///
/// Owned by a single pipeline run; nothing is cached across runs.
pub struct CompiledSchema {
    schema: Value,
    compiled: JSONSchema,
}

impl CompiledSchema {
    /// Compiles a schema document with `format` assertion enabled.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` if the document is not an object or boolean, or if
    /// `jsonschema` refuses it (bad keyword values, uncompilable `pattern`).
    pub fn compile(schema: &Value) -> ValidatorResult<Self> {
        if !schema.is_object() && !schema.is_boolean() {
            return Err(ValidatorError::InvalidSchema(format!(
                "schema must be an object or boolean, got {}",
                json_type_name(schema)
            )));
        }

        let compiled = JSONSchema::options()
            .should_validate_formats(true)
            .compile(schema)
            .map_err(|e| ValidatorError::InvalidSchema(e.to_string()))?;

        Ok(Self {
            schema: schema.clone(),
            compiled,
        })
    }

    /// Returns the schema document this was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validates a document, returning every violation (empty = valid).
    pub fn validate(&self, document: &Value) -> Vec<ValidationViolation> {
        let violations: Vec<ValidationViolation> = match self.compiled.validate(document) {
            Ok(()) => return Vec::new(),
            Err(errors) => errors
                .flat_map(|error| translate(&self.schema, &error))
                .collect(),
        };
        drop_within_incomplete_objects(violations)
    }

    /// Returns true if the document has no violations.
    pub fn is_valid(&self, document: &Value) -> bool {
        self.compiled.is_valid(document)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Validates `document` against `schema`.
///
/// Compiles the schema and enumerates every violation. An empty list means valid.
pub fn validate(schema: &Value, document: &Value) -> ValidatorResult<Vec<ValidationViolation>> {
    Ok(CompiledSchema::compile(schema)?.validate(document))
}

/// Maps one engine error to its wire violations.
///
/// Unexpected-property errors fan out to one violation per property.
fn translate(schema: &Value, error: &ValidationError<'_>) -> Vec<ValidationViolation> {
    let instance_path = error.instance_path.to_string();
    let location = pointer::locate(schema, error.schema_path.clone().into_vec());
    let at = instance_path.as_str();
    let path = location.path.as_str();

    let violation = match &error.kind {
        ValidationErrorKind::Required { property } => {
            ValidationViolation::missing_property(at, path, &text(property))
        }
        ValidationErrorKind::Type { kind } => {
            ValidationViolation::type_mismatch(at, path, &expected_types(kind, location.node))
        }
        ValidationErrorKind::FalseSchema => ValidationViolation::false_schema(at, path),
        ValidationErrorKind::Constant { expected_value } => {
            ValidationViolation::not_const(at, path, expected_value)
        }
        ValidationErrorKind::Enum { options } => ValidationViolation::not_in_enum(at, path, options),
        ValidationErrorKind::MaxLength { limit } => {
            ValidationViolation::size_limit(at, path, "maxLength", *limit, "characters")
        }
        ValidationErrorKind::MinLength { limit } => {
            ValidationViolation::size_limit(at, path, "minLength", *limit, "characters")
        }
        ValidationErrorKind::MaxItems { limit } => {
            ValidationViolation::size_limit(at, path, "maxItems", *limit, "items")
        }
        ValidationErrorKind::MinItems { limit } => {
            ValidationViolation::size_limit(at, path, "minItems", *limit, "items")
        }
        ValidationErrorKind::AdditionalItems { limit } => {
            ValidationViolation::size_limit(at, path, "additionalItems", *limit as u64, "items")
        }
        ValidationErrorKind::MaxProperties { limit } => {
            ValidationViolation::size_limit(at, path, "maxProperties", *limit, "properties")
        }
        ValidationErrorKind::MinProperties { limit } => {
            ValidationViolation::size_limit(at, path, "minProperties", *limit, "properties")
        }
        ValidationErrorKind::Pattern { pattern } => {
            ValidationViolation::pattern_mismatch(at, path, pattern)
        }
        ValidationErrorKind::Format { format } => {
            ValidationViolation::format_mismatch(at, path, format)
        }
        ValidationErrorKind::Maximum { limit } => {
            ValidationViolation::out_of_range(at, path, "maximum", "<=", limit)
        }
        ValidationErrorKind::Minimum { limit } => {
            ValidationViolation::out_of_range(at, path, "minimum", ">=", limit)
        }
        ValidationErrorKind::ExclusiveMaximum { limit } => {
            ValidationViolation::out_of_range(at, path, "exclusiveMaximum", "<", limit)
        }
        ValidationErrorKind::ExclusiveMinimum { limit } => {
            ValidationViolation::out_of_range(at, path, "exclusiveMinimum", ">", limit)
        }
        ValidationErrorKind::MultipleOf { multiple_of } => {
            // The declared number keeps its spelling (`2`, not `2.0`).
            let declared = location
                .node
                .filter(|v| v.is_number())
                .cloned()
                .unwrap_or_else(|| json!(multiple_of));
            ValidationViolation::not_multiple_of(at, path, &declared)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            return unexpected
                .iter()
                .map(|property| ValidationViolation::additional_property(at, path, property))
                .collect();
        }
        ValidationErrorKind::UnevaluatedProperties { unexpected } => {
            return unexpected
                .iter()
                .map(|property| ValidationViolation::unevaluated_property(at, path, property))
                .collect();
        }
        ValidationErrorKind::UniqueItems => match duplicate_pair(&error.instance) {
            Some((later, earlier)) => {
                ValidationViolation::duplicate_items(at, path, later, earlier)
            }
            None => ValidationViolation::new(
                at,
                path,
                "uniqueItems",
                Map::new(),
                "must NOT have duplicate items",
            ),
        },
        ValidationErrorKind::Contains => ValidationViolation::missing_contains(at, path),
        ValidationErrorKind::PropertyNames { error: inner } => {
            ValidationViolation::invalid_property_name(at, path, &text(&inner.instance))
        }
        ValidationErrorKind::AnyOf => ValidationViolation::any_of(at, path),
        ValidationErrorKind::OneOfNotValid => ValidationViolation::one_of_none(at, path),
        ValidationErrorKind::OneOfMultipleValid => ValidationViolation::one_of_many(at, path),
        ValidationErrorKind::Not { .. } => ValidationViolation::not(at, path),
        _ => ValidationViolation::new(
            at,
            path,
            pointer::last_token(path).unwrap_or_else(|| "schema".to_string()),
            Map::new(),
            error.to_string(),
        ),
    };
    vec![violation]
}

/// Drops violations located at or below an object that is missing required
/// properties, keeping that object's own `required` violations.
fn drop_within_incomplete_objects(violations: Vec<ValidationViolation>) -> Vec<ValidationViolation> {
    let incomplete: BTreeSet<String> = violations
        .iter()
        .filter(|v| v.keyword == "required")
        .map(|v| v.instance_path.clone())
        .collect();
    if incomplete.is_empty() {
        return violations;
    }

    violations
        .into_iter()
        .filter(|v| {
            incomplete.iter().all(|object| {
                !pointer::contains(object, &v.instance_path)
                    || (v.keyword == "required" && v.instance_path == *object)
            })
        })
        .collect()
}

/// Type names as the schema spells them, falling back to the engine's.
fn expected_types(kind: &TypeKind, declared: Option<&Value>) -> String {
    match declared {
        Some(Value::String(name)) => return name.clone(),
        Some(Value::Array(names)) if names.iter().all(Value::is_string) => {
            return names
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",");
        }
        _ => {}
    }
    match kind {
        TypeKind::Single(primitive) => primitive.to_string(),
        TypeKind::Multiple(types) => (*types)
            .into_iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// First `(later, earlier)` pair of identical items.
fn duplicate_pair(instance: &Value) -> Option<(usize, usize)> {
    let items = instance.as_array()?;
    (1..items.len()).find_map(|later| {
        (0..later)
            .find(|&earlier| items[earlier] == items[later])
            .map(|earlier| (later, earlier))
    })
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
