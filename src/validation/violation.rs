//! Structured validation violations
//!
//! The serialized form is consumed by existing loaders and must keep the
//! camelCase keys `instancePath`, `schemaPath`, `keyword`, `params`, `message`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single rule failure with its location in the document and in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// JSON Pointer into the validated document
    #[serde(rename = "instancePath")]
    pub instance_path: String,
    /// `#`-rooted JSON Pointer to the failing keyword in the schema
    #[serde(rename = "schemaPath")]
    pub schema_path: String,
    /// Rule violated (`required`, `type`, `minLength`, ...)
    pub keyword: String,
    /// Rule-specific detail, e.g. `{"missingProperty": "school_name"}`
    pub params: Map<String, Value>,
    /// Human-readable description
    pub message: String,
}

impl ValidationViolation {
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        keyword: impl Into<String>,
        params: Map<String, Value>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            keyword: keyword.into(),
            params,
            message: message.into(),
        }
    }

    pub fn missing_property(instance_path: &str, schema_path: &str, property: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "required",
            params(json!({ "missingProperty": property })),
            format!("must have required property '{}'", property),
        )
    }

    /// `expected` is the comma-joined list of accepted type names
    pub fn type_mismatch(instance_path: &str, schema_path: &str, expected: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "type",
            params(json!({ "type": expected })),
            format!("must be {}", expected),
        )
    }

    pub fn false_schema(instance_path: &str, schema_path: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "false schema",
            Map::new(),
            "boolean schema is false",
        )
    }

    pub fn not_const(instance_path: &str, schema_path: &str, allowed: &Value) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "const",
            params(json!({ "allowedValue": allowed })),
            "must be equal to constant",
        )
    }

    pub fn not_in_enum(instance_path: &str, schema_path: &str, allowed: &Value) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "enum",
            params(json!({ "allowedValues": allowed })),
            "must be equal to one of the allowed values",
        )
    }

    /// `maxLength`/`minLength`, `maxItems`/`minItems`, `maxProperties`/`minProperties`
    pub fn size_limit(
        instance_path: &str,
        schema_path: &str,
        keyword: &str,
        limit: u64,
        noun: &str,
    ) -> Self {
        let bound = if keyword.starts_with("max") {
            "more"
        } else {
            "fewer"
        };
        Self::new(
            instance_path,
            schema_path,
            keyword,
            params(json!({ "limit": limit })),
            format!("must NOT have {} than {} {}", bound, limit, noun),
        )
    }

    pub fn pattern_mismatch(instance_path: &str, schema_path: &str, pattern: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "pattern",
            params(json!({ "pattern": pattern })),
            format!("must match pattern \"{}\"", pattern),
        )
    }

    /// `maximum`, `minimum`, `exclusiveMaximum`, `exclusiveMinimum`
    pub fn out_of_range(
        instance_path: &str,
        schema_path: &str,
        keyword: &str,
        comparison: &str,
        limit: &Value,
    ) -> Self {
        Self::new(
            instance_path,
            schema_path,
            keyword,
            params(json!({ "comparison": comparison, "limit": limit })),
            format!("must be {} {}", comparison, limit),
        )
    }

    pub fn not_multiple_of(instance_path: &str, schema_path: &str, multiple_of: &Value) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "multipleOf",
            params(json!({ "multipleOf": multiple_of })),
            format!("must be multiple of {}", multiple_of),
        )
    }

    pub fn additional_property(instance_path: &str, schema_path: &str, property: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "additionalProperties",
            params(json!({ "additionalProperty": property })),
            "must NOT have additional properties",
        )
    }

    /// `later` and `earlier` are the indices of two identical items
    pub fn duplicate_items(
        instance_path: &str,
        schema_path: &str,
        later: usize,
        earlier: usize,
    ) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "uniqueItems",
            params(json!({ "i": later, "j": earlier })),
            format!(
                "must NOT have duplicate items (items ## {} and {} are identical)",
                earlier, later
            ),
        )
    }

    pub fn any_of(instance_path: &str, schema_path: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "anyOf",
            Map::new(),
            "must match a schema in anyOf",
        )
    }

    /// No branch matched: `passingSchemas` is null.
    pub fn one_of_none(instance_path: &str, schema_path: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "oneOf",
            params(json!({ "passingSchemas": Value::Null })),
            "must match exactly one schema in oneOf",
        )
    }

    pub fn one_of_many(instance_path: &str, schema_path: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "oneOf",
            Map::new(),
            "must match exactly one schema in oneOf",
        )
    }

    pub fn not(instance_path: &str, schema_path: &str) -> Self {
        Self::new(instance_path, schema_path, "not", Map::new(), "must NOT be valid")
    }

    pub fn format_mismatch(instance_path: &str, schema_path: &str, format: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "format",
            params(json!({ "format": format })),
            format!("must match format \"{}\"", format),
        )
    }

    pub fn unevaluated_property(instance_path: &str, schema_path: &str, property: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "unevaluatedProperties",
            params(json!({ "unevaluatedProperty": property })),
            "must NOT have unevaluated properties",
        )
    }

    pub fn missing_contains(instance_path: &str, schema_path: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "contains",
            params(json!({ "minContains": 1 })),
            "must contain at least 1 valid item(s)",
        )
    }

    pub fn invalid_property_name(instance_path: &str, schema_path: &str, name: &str) -> Self {
        Self::new(
            instance_path,
            schema_path,
            "propertyNames",
            params(json!({ "propertyName": name })),
            "property name must be valid",
        )
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        };
        write!(f, "{} {} ({})", location, self.message, self.schema_path)
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
