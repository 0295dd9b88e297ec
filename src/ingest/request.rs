//! Ingestion request as posted by upstream loaders

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::SchemaKind;

/// Wire key carrying the tracking id, shared by every kind.
const TRACKING_KEY: &str = "file_tracker_pid";

/// One named batch of records to ingest.
///
/// Wire form: `{"dimension_name": ..., "dimension": [...], "file_tracker_pid": ...}`.
/// Other kinds use their own envelope keys, see [`IngestionRequest::from_wire`].
/// Missing fields decode to their empty values so that the pipeline, not the
/// parser, decides how to reject them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionRequest {
    #[serde(rename = "dimension_name", default)]
    pub entity_name: String,

    #[serde(rename = "dimension", default)]
    pub records: Vec<Value>,

    #[serde(rename = "file_tracker_pid", default)]
    pub tracking_id: i64,
}

impl IngestionRequest {
    pub fn new(entity_name: impl Into<String>, records: Vec<Value>, tracking_id: i64) -> Self {
        Self {
            entity_name: entity_name.into(),
            records,
            tracking_id,
        }
    }

    /// Decodes a request using the envelope keys of `kind`
    /// (`event_name`/`event`, `dataset_name`/`dataset`, ...).
    ///
    /// Keys of other kinds are ignored.
    pub fn from_wire(kind: SchemaKind, value: Value) -> Result<Self, serde_json::Error> {
        let mut fields: Map<String, Value> = serde_json::from_value(value)?;
        Ok(Self {
            entity_name: take_field(&mut fields, kind.name_key())?,
            records: take_field(&mut fields, kind.records_key())?,
            tracking_id: take_field(&mut fields, TRACKING_KEY)?,
        })
    }

    /// True if the name is empty or whitespace only
    pub fn has_blank_name(&self) -> bool {
        self.entity_name.trim().is_empty()
    }
}

fn take_field<T>(fields: &mut Map<String, Value>, key: &str) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match fields.remove(key) {
        Some(value) => serde_json::from_value(value),
        None => Ok(T::default()),
    }
}
