//! CLI module for dimension-ingest
//!
//! Provides command-line interface for:
//! - init: Create the data directory and registry layout
//! - ingest: Validate and persist one request
//! - check: Validate one request without persisting
//! - inspect: List stored batches

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, ingest, init, inspect, run, run_command, BatchSummary};
pub use errors::{CliError, CliResult};
pub use io::{parse_request, read_request, write_json};
