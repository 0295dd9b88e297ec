//! Schema descriptor types
//!
//! A registry row looks like:
//!
//! ```text
//! {
//!   "dimension_data": {
//!     "input": { ...JSON Schema... },
//!     "dimension_name": "school",
//!     "ingestion_type": "dimension"
//!   }
//! }
//! ```
//!
//! The column value may also be a string holding the serialized object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{RegistryError, RegistryResult};

/// Kind of ingestion a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Dimension,
    Event,
    Dataset,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [SchemaKind::Dimension, SchemaKind::Event, SchemaKind::Dataset];

    /// Returns the lowercase kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Dimension => "dimension",
            SchemaKind::Event => "event",
            SchemaKind::Dataset => "dataset",
        }
    }

    /// Envelope key carrying the entity name (`dimension_name`)
    pub fn name_key(&self) -> &'static str {
        match self {
            SchemaKind::Dimension => "dimension_name",
            SchemaKind::Event => "event_name",
            SchemaKind::Dataset => "dataset_name",
        }
    }

    /// Envelope key carrying the records (`dimension`)
    pub fn records_key(&self) -> &'static str {
        self.as_str()
    }

    /// Registry column holding the schema row (`dimension_data`)
    pub fn registry_column(&self) -> &'static str {
        match self {
            SchemaKind::Dimension => "dimension_data",
            SchemaKind::Event => "event_data",
            SchemaKind::Dataset => "dataset_data",
        }
    }

    /// Builds the candidate document the schema describes.
    ///
    /// The schema covers the whole envelope, so both the name and the records
    /// are validated.
    pub fn envelope(&self, entity_name: &str, records: &[Value]) -> Value {
        let mut doc = Map::new();
        doc.insert(self.name_key().to_string(), json!(entity_name));
        doc.insert(self.records_key().to_string(), Value::Array(records.to_vec()));
        Value::Object(doc)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dimension" => Ok(SchemaKind::Dimension),
            "event" => Ok(SchemaKind::Event),
            "dataset" => Ok(SchemaKind::Dataset),
            other => Err(format!("unknown ingestion type '{}'", other)),
        }
    }
}

/// The structural schema currently active for one entity.
///
/// Immutable once fetched and owned by a single pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub entity_name: String,
    pub schema: Value,
    pub schema_kind: SchemaKind,
}

impl SchemaDescriptor {
    pub fn new(entity_name: impl Into<String>, schema: Value, schema_kind: SchemaKind) -> Self {
        Self {
            entity_name: entity_name.into(),
            schema,
            schema_kind,
        }
    }

    /// Decodes a registry row.
    ///
    /// # Errors
    ///
    /// `MalformedEntry` if the kind column is missing, not an object (or a
    /// string holding one), has no object-valued `input`, or names an unknown
    /// `ingestion_type`.
    pub fn from_row(kind: SchemaKind, entity_name: &str, row: &Value) -> RegistryResult<Self> {
        let column_name = kind.registry_column();
        let column = row
            .get(column_name)
            .ok_or_else(|| RegistryError::malformed(entity_name, format!("missing '{}'", column_name)))?;

        let parsed;
        let column = match column {
            Value::String(raw) => {
                parsed = serde_json::from_str::<Value>(raw).map_err(|e| {
                    RegistryError::malformed(entity_name, format!("'{}' is not JSON: {}", column_name, e))
                })?;
                &parsed
            }
            other => other,
        };

        let column = column.as_object().ok_or_else(|| {
            RegistryError::malformed(entity_name, format!("'{}' must be an object", column_name))
        })?;

        let schema = match column.get("input") {
            Some(input @ Value::Object(_)) => input.clone(),
            Some(_) => {
                return Err(RegistryError::malformed(entity_name, "'input' must be an object"))
            }
            None => return Err(RegistryError::malformed(entity_name, "missing 'input'")),
        };

        let schema_kind = match column.get("ingestion_type") {
            None | Some(Value::Null) => kind,
            Some(Value::String(s)) => s
                .parse()
                .map_err(|e: String| RegistryError::malformed(entity_name, e))?,
            Some(_) => {
                return Err(RegistryError::malformed(
                    entity_name,
                    "'ingestion_type' must be a string",
                ))
            }
        };

        Ok(Self::new(entity_name, schema, schema_kind))
    }

    /// Builds the registry row this descriptor would be stored as.
    pub fn to_row(&self) -> Value {
        let mut column = Map::new();
        column.insert("input".to_string(), self.schema.clone());
        column.insert(self.schema_kind.name_key().to_string(), json!(self.entity_name));
        column.insert("ingestion_type".to_string(), json!(self.schema_kind.as_str()));

        let mut row = Map::new();
        row.insert(self.schema_kind.registry_column().to_string(), Value::Object(column));
        Value::Object(row)
    }
}
