//! Service configuration
//!
//! Loaded from a JSON file (default `./ingest.json`):
//!
//! ```text
//! {
//!   "data_dir": "/var/lib/ingest",
//!   "registry_dir": "/etc/ingest/schemas",
//!   "sync_mode": "fsync",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required. Unknown keys are rejected.

mod errors;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

pub use errors::{ConfigError, ConfigResult};

pub const DEFAULT_CONFIG_PATH: &str = "./ingest.json";

const SYNC_MODES: [&str; 2] = ["fsync", "none"];
const LOG_LEVELS: [&str; 4] = ["trace", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the batch log (required)
    pub data_dir: String,

    /// Schema registry root, defaults to `<data_dir>/metadata/schemas`
    #[serde(default)]
    pub registry_dir: Option<String>,

    /// "fsync" or "none"
    #[serde(default = "default_sync_mode")]
    pub sync_mode: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sync_mode() -> String {
    "fsync".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Config with defaults for everything but `data_dir`.
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            registry_dir: None,
            sync_mode: default_sync_mode(),
            log_level: default_log_level(),
        }
    }

    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates configuration JSON.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::invalid("data_dir must not be empty"));
        }

        if let Some(dir) = &self.registry_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::invalid("registry_dir must not be empty"));
            }
        }

        if !SYNC_MODES.contains(&self.sync_mode.as_str()) {
            return Err(ConfigError::invalid(format!(
                "Invalid sync_mode: '{}'. Must be 'fsync' or 'none'.",
                self.sync_mode
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Directory holding the schema registry.
    pub fn registry_path(&self) -> PathBuf {
        match &self.registry_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.data_path().join("metadata").join("schemas"),
        }
    }

    /// True if every batch append is fsynced.
    pub fn sync_writes(&self) -> bool {
        self.sync_mode == "fsync"
    }

    pub fn log_severity(&self) -> ConfigResult<Severity> {
        Severity::from_str(&self.log_level).map_err(ConfigError::invalid)
    }
}
