//! Ingestion outcome and its wire shape
//!
//! ```text
//! success:           {"code": 200, "message": "Dimension added successfully"}
//! name missing:      {"code": 400, "error": "Dimension name is missing"}
//! not found:         {"code": 400, "error": "No dimension found"}
//! validation failed: {"code": 400, "error": [{"instancePath": ..., ...}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::schema::SchemaKind;
use crate::validation::ValidationViolation;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Error payload of a rejected request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureDetail {
    Text(String),
    Violations(Vec<ValidationViolation>),
}

/// Result of one pipeline run. Exactly one of `message`/`error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Success { code: u16, message: String },
    Failure { code: u16, error: FailureDetail },
}

impl IngestOutcome {
    pub fn added(kind: SchemaKind) -> Self {
        IngestOutcome::Success {
            code: STATUS_OK,
            message: format!("{} added successfully", title(kind)),
        }
    }

    pub fn name_missing(kind: SchemaKind) -> Self {
        Self::rejected(format!("{} name is missing", title(kind)))
    }

    pub fn not_found(kind: SchemaKind) -> Self {
        Self::rejected(format!("No {} found", kind.as_str()))
    }

    pub fn invalid(violations: Vec<ValidationViolation>) -> Self {
        IngestOutcome::Failure {
            code: STATUS_BAD_REQUEST,
            error: FailureDetail::Violations(violations),
        }
    }

    fn rejected(message: String) -> Self {
        IngestOutcome::Failure {
            code: STATUS_BAD_REQUEST,
            error: FailureDetail::Text(message),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            IngestOutcome::Success { code, .. } | IngestOutcome::Failure { code, .. } => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IngestOutcome::Success { .. })
    }

    /// Returns the violation list of a validation failure.
    pub fn violations(&self) -> Option<&[ValidationViolation]> {
        match self {
            IngestOutcome::Failure {
                error: FailureDetail::Violations(v),
                ..
            } => Some(v),
            _ => None,
        }
    }

    /// Returns the message of a success or the text of a plain failure.
    pub fn text(&self) -> Option<&str> {
        match self {
            IngestOutcome::Success { message, .. } => Some(message),
            IngestOutcome::Failure {
                error: FailureDetail::Text(text),
                ..
            } => Some(text),
            IngestOutcome::Failure { .. } => None,
        }
    }
}

fn title(kind: SchemaKind) -> &'static str {
    match kind {
        SchemaKind::Dimension => "Dimension",
        SchemaKind::Event => "Event",
        SchemaKind::Dataset => "Dataset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let outcome = IngestOutcome::added(SchemaKind::Dimension);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "code": 200, "message": "Dimension added successfully" })
        );
        assert!(outcome.is_success());
    }

    #[test]
    fn test_text_failure_wire_shape() {
        assert_eq!(
            serde_json::to_value(IngestOutcome::not_found(SchemaKind::Dimension)).unwrap(),
            json!({ "code": 400, "error": "No dimension found" })
        );
        assert_eq!(
            serde_json::to_value(IngestOutcome::name_missing(SchemaKind::Dimension)).unwrap(),
            json!({ "code": 400, "error": "Dimension name is missing" })
        );
    }

    #[test]
    fn test_violation_failure_wire_shape() {
        let violation = ValidationViolation::missing_property(
            "/dimension/0",
            "#/properties/dimension/items/required",
            "school_name",
        );
        let outcome = IngestOutcome::invalid(vec![violation]);

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "code": 400,
                "error": [{
                    "instancePath": "/dimension/0",
                    "schemaPath": "#/properties/dimension/items/required",
                    "keyword": "required",
                    "params": { "missingProperty": "school_name" },
                    "message": "must have required property 'school_name'"
                }]
            })
        );
        assert_eq!(outcome.violations().map(|v| v.len()), Some(1));
        assert!(outcome.text().is_none());
    }

    #[test]
    fn test_decode_outcomes() {
        let outcome: IngestOutcome =
            serde_json::from_value(json!({ "code": 400, "error": "No dimension found" })).unwrap();
        assert_eq!(outcome, IngestOutcome::not_found(SchemaKind::Dimension));

        let outcome: IngestOutcome =
            serde_json::from_value(json!({ "code": 200, "message": "Dimension added successfully" }))
                .unwrap();
        assert_eq!(outcome.code(), 200);
    }

    #[test]
    fn test_messages_follow_kind() {
        assert_eq!(
            IngestOutcome::not_found(SchemaKind::Event).text(),
            Some("No event found")
        );
        assert_eq!(
            IngestOutcome::added(SchemaKind::Dataset).text(),
            Some("Dataset added successfully")
        );
    }
}
