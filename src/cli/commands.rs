//! CLI command implementations
//!
//! Each command loads the configuration, applies the log level and performs
//! one unit of work. Rejected requests are normal output; only infrastructure
//! failures surface as errors.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::ingest::{IngestOutcome, IngestionPipeline};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::{DirectorySchemaRegistry, SchemaKind, SchemaRegistry};
use crate::storage::{
    batch_log_path, BatchReader, FileDispatcher, MemoryDispatcher, PersistenceDispatcher,
    StorageError,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Ingest {
            config,
            input,
            kind,
        } => {
            let outcome = ingest(&config, input.as_deref(), kind)?;
            write_json(&outcome)
        }
        Command::Check {
            config,
            input,
            kind,
        } => {
            let outcome = check(&config, input.as_deref(), kind)?;
            write_json(&outcome)
        }
        Command::Inspect { config } => {
            let summaries = inspect(&config)?;
            write_json(&json!({ "count": summaries.len(), "batches": summaries }))
        }
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_dir", config.data_dir.as_str()),
            ("sync_mode", config.sync_mode.as_str()),
        ],
    );
    Ok(config)
}

/// Creates `<data_dir>/data/batches.log` and the registry kind directories.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::AlreadyInitialized);
    }

    FileDispatcher::open(data_dir, config.sync_writes())?;
    let registry = DirectorySchemaRegistry::new(config.registry_path());
    registry.create_layout()?;

    let registry_dir = registry.root().display().to_string();
    log_event_with_fields(
        Event::InitComplete,
        &[
            ("data_dir", config.data_dir.as_str()),
            ("registry_dir", registry_dir.as_str()),
        ],
    );
    write_json(&json!({ "initialized": true, "registry_dir": registry_dir }))
}

/// Runs the full pipeline and persists accepted batches to the batch log.
pub fn ingest(
    config_path: &Path,
    input: Option<&Path>,
    kind: SchemaKind,
) -> CliResult<IngestOutcome> {
    let config = load_config(config_path)?;
    if !is_initialized(config.data_path()) {
        return Err(CliError::NotInitialized);
    }

    let dispatcher = FileDispatcher::open(config.data_path(), config.sync_writes())
        .map_err(report_storage_error)?;
    let path = dispatcher.path().display().to_string();
    let batches = dispatcher.batch_count().to_string();
    log_event_with_fields(
        Event::StorageOpened,
        &[("batches", batches.as_str()), ("path", path.as_str())],
    );

    let registry = DirectorySchemaRegistry::new(config.registry_path());
    run_pipeline(registry, dispatcher, input, kind)
}

/// Runs name check, resolution and validation without persisting anything.
pub fn check(
    config_path: &Path,
    input: Option<&Path>,
    kind: SchemaKind,
) -> CliResult<IngestOutcome> {
    let config = load_config(config_path)?;
    let registry = DirectorySchemaRegistry::new(config.registry_path());
    run_pipeline(registry, MemoryDispatcher::new(), input, kind)
}

fn run_pipeline<R, D>(
    registry: R,
    dispatcher: D,
    input: Option<&Path>,
    kind: SchemaKind,
) -> CliResult<IngestOutcome>
where
    R: SchemaRegistry,
    D: PersistenceDispatcher,
{
    let request = read_request(input, kind)?;
    let pipeline = IngestionPipeline::new(registry, dispatcher).with_kind(kind);
    Ok(pipeline.ingest(&request)?)
}

/// One line of `inspect` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub batch_id: String,
    pub entity_name: String,
    pub tracking_id: i64,
    pub record_count: usize,
    pub ingested_at: String,
}

/// Reads and verifies every stored batch.
pub fn inspect(config_path: &Path) -> CliResult<Vec<BatchSummary>> {
    let config = load_config(config_path)?;
    if !is_initialized(config.data_path()) {
        return Err(CliError::NotInitialized);
    }

    let batches = BatchReader::open_from_data_dir(config.data_path())
        .and_then(|mut reader| reader.read_all())
        .map_err(report_storage_error)?;

    Ok(batches
        .into_iter()
        .map(|batch| BatchSummary {
            batch_id: batch.batch_id.to_string(),
            entity_name: batch.entity_name,
            tracking_id: batch.tracking_id,
            record_count: batch.records.len(),
            ingested_at: batch.ingested_at.to_rfc3339(),
        })
        .collect())
}

fn report_storage_error(error: StorageError) -> CliError {
    if error.is_fatal() {
        let message = error.to_string();
        log_event_with_fields(
            Event::StorageCorruption,
            &[("code", error.code()), ("error", message.as_str())],
        );
    }
    CliError::Storage(error)
}

fn is_initialized(data_dir: &Path) -> bool {
    batch_log_path(data_dir).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDescriptor;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("ingest.json");
        let config = json!({
            "data_dir": temp_dir.path().join("store").display().to_string(),
            "sync_mode": "none",
            "log_level": "error"
        });
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    fn register_school(config_path: &Path) {
        let config = Config::load(config_path).unwrap();
        DirectorySchemaRegistry::new(config.registry_path())
            .save(&SchemaDescriptor::new(
                "school",
                json!({
                    "type": "object",
                    "properties": {
                        "dimension": {
                            "type": "array",
                            "items": { "type": "object", "required": ["school_id", "school_name"] }
                        }
                    }
                }),
                SchemaKind::Dimension,
            ))
            .unwrap();
    }

    fn write_request(temp_dir: &TempDir, request: serde_json::Value) -> PathBuf {
        let path = temp_dir.path().join("request.json");
        fs::write(&path, request.to_string()).unwrap();
        path
    }

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);

        init(&config_path).unwrap();
        let store = temp_dir.path().join("store");
        assert!(batch_log_path(&store).exists());
        assert!(store.join("metadata").join("schemas").join("dimension").is_dir());

        assert!(matches!(init(&config_path), Err(CliError::AlreadyInitialized)));
    }

    #[test]
    fn test_ingest_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        let input = write_request(&temp_dir, json!({ "dimension_name": "school" }));

        let err = ingest(&config_path, Some(&input), SchemaKind::Dimension).unwrap_err();
        assert!(matches!(err, CliError::NotInitialized));
    }

    #[test]
    fn test_ingest_then_inspect() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        init(&config_path).unwrap();
        register_school(&config_path);

        let input = write_request(
            &temp_dir,
            json!({
                "dimension_name": "school",
                "dimension": [{ "school_id": "6677", "school_name": "test" }],
                "file_tracker_pid": 21
            }),
        );
        let outcome = ingest(&config_path, Some(&input), SchemaKind::Dimension).unwrap();
        assert!(outcome.is_success());

        let summaries = inspect(&config_path).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entity_name, "school");
        assert_eq!(summaries[0].tracking_id, 21);
        assert_eq!(summaries[0].record_count, 1);
    }

    #[test]
    fn test_rejection_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        init(&config_path).unwrap();

        let input = write_request(
            &temp_dir,
            json!({ "dimension_name": "district", "dimension": [{ "name": "jhaha" }] }),
        );
        let outcome = ingest(&config_path, Some(&input), SchemaKind::Dimension).unwrap();
        assert_eq!(outcome.text(), Some("No dimension found"));
        assert!(inspect(&config_path).unwrap().is_empty());
    }

    #[test]
    fn test_ingest_event_kind() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        init(&config_path).unwrap();
        let config = Config::load(&config_path).unwrap();
        DirectorySchemaRegistry::new(config.registry_path())
            .save(&SchemaDescriptor::new(
                "attendance",
                json!({
                    "type": "object",
                    "required": ["event_name", "event"],
                    "properties": {
                        "event": {
                            "type": "array",
                            "items": { "type": "object", "required": ["present"] }
                        }
                    }
                }),
                SchemaKind::Event,
            ))
            .unwrap();

        let input = write_request(
            &temp_dir,
            json!({
                "event_name": "attendance",
                "event": [{ "present": true }],
                "file_tracker_pid": 1
            }),
        );
        let outcome = ingest(&config_path, Some(&input), SchemaKind::Event).unwrap();
        assert_eq!(outcome.text(), Some("Event added successfully"));

        let summaries = inspect(&config_path).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].entity_name, "attendance");
        assert_eq!(summaries[0].tracking_id, 1);
    }

    #[test]
    fn test_check_does_not_persist() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        init(&config_path).unwrap();
        register_school(&config_path);

        let input = write_request(
            &temp_dir,
            json!({
                "dimension_name": "school",
                "dimension": [{ "school_id": "6677", "school_name": "test" }]
            }),
        );
        let outcome = check(&config_path, Some(&input), SchemaKind::Dimension).unwrap();
        assert!(outcome.is_success());
        assert!(inspect(&config_path).unwrap().is_empty());
    }

    #[test]
    fn test_inspect_reports_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir);
        init(&config_path).unwrap();
        register_school(&config_path);

        let input = write_request(
            &temp_dir,
            json!({
                "dimension_name": "school",
                "dimension": [{ "school_id": "1", "school_name": "a" }]
            }),
        );
        ingest(&config_path, Some(&input), SchemaKind::Dimension).unwrap();

        let log = batch_log_path(&temp_dir.path().join("store"));
        let mut bytes = fs::read(&log).unwrap();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xFF;
        fs::write(&log, bytes).unwrap();

        let err = inspect(&config_path).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "INGEST_DATA_CORRUPTION");
    }
}
