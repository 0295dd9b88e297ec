//! Persistence dispatch for accepted batches
//!
//! Accepted batches are handed to a `PersistenceDispatcher`. The file-backed
//! dispatcher keeps them in an append-only record log.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates)
//! - Checksum-verified on every read
//! - One record per accepted batch
//! - Dispatcher errors propagate unchanged

mod checksum;
mod dispatcher;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use dispatcher::{InsertCall, MemoryDispatcher, PersistenceDispatcher};
pub use errors::{StorageError, StorageResult};
pub use reader::BatchReader;
pub use record::BatchRecord;
pub use writer::{batch_log_path, FileDispatcher};
