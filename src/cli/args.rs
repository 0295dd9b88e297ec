//! CLI argument definitions using clap
//!
//! Commands:
//! - dimension-ingest init --config <path>
//! - dimension-ingest ingest --config <path> [--input <file>] [--kind <kind>]
//! - dimension-ingest check --config <path> [--input <file>] [--kind <kind>]
//! - dimension-ingest inspect --config <path>

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::schema::SchemaKind;

/// Schema-validated ingestion of named record batches
#[derive(Parser, Debug)]
#[command(name = "dimension-ingest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and schema registry layout
    Init {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Validate one request and persist it if accepted
    Ingest {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Request JSON file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Ingestion kind: dimension, event or dataset
        #[arg(long, default_value = "dimension")]
        kind: SchemaKind,
    },

    /// Validate one request without persisting it
    Check {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Request JSON file (stdin if omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Ingestion kind: dimension, event or dataset
        #[arg(long, default_value = "dimension")]
        kind: SchemaKind,
    },

    /// List stored batches after checksum verification
    Inspect {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
