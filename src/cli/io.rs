//! JSON I/O handling for the CLI
//!
//! - Input: one request object, from a file or stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::ingest::IngestionRequest;
use crate::schema::SchemaKind;

/// Reads one `kind` request from `input`, or from stdin if `None`.
pub fn read_request(input: Option<&Path>, kind: SchemaKind) -> CliResult<IngestionRequest> {
    let content = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_request(&content, kind)
}

/// Parses request JSON with the envelope keys of `kind`.
pub fn parse_request(content: &str, kind: SchemaKind) -> CliResult<IngestionRequest> {
    if content.trim().is_empty() {
        return Err(CliError::InvalidRequest("Empty input".into()));
    }
    let value: Value = serde_json::from_str(content)?;
    Ok(IngestionRequest::from_wire(kind, value)?)
}

/// Writes `value` as one JSON line to stdout.
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_request() {
        let request = parse_request(
            r#"{"dimension_name":"school","dimension":[{"school_id":"1"}],"file_tracker_pid":5}"#,
            SchemaKind::Dimension,
        )
        .unwrap();
        assert_eq!(request.entity_name, "school");
        assert_eq!(request.tracking_id, 5);
    }

    #[test]
    fn test_parse_event_request() {
        let request = parse_request(
            r#"{"event_name":"attendance","event":[{"present":true}],"file_tracker_pid":1}"#,
            SchemaKind::Event,
        )
        .unwrap();
        assert_eq!(request.entity_name, "attendance");
        assert_eq!(request.records.len(), 1);
        assert_eq!(request.tracking_id, 1);
    }

    #[test]
    fn test_non_object_request_rejected() {
        let err = parse_request("[1, 2]", SchemaKind::Dimension).unwrap_err();
        assert_eq!(err.code(), "INGEST_CLI_INVALID_REQUEST");
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            parse_request("  \n", SchemaKind::Dimension),
            Err(CliError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_read_request_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("request.json");
        fs::write(&path, r#"{"dimension_name":"district","dimension":[]}"#).unwrap();

        let request = read_request(Some(&path), SchemaKind::Dimension).unwrap();
        assert_eq!(request.entity_name, "district");
        assert!(request.records.is_empty());
    }
}
