//! File-backed persistence dispatcher
//!
//! Accepted batches are appended to `<data_dir>/data/batches.log`. The log is
//! append-only; records are never rewritten. With `sync_writes` every append
//! is followed by fsync and the insert is not acknowledged until it completes.
//!
//! A failed append is rewound: the log is truncated back to the last
//! acknowledged offset, so a torn frame never precedes later batches.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::dispatcher::PersistenceDispatcher;
use super::errors::{StorageError, StorageResult};
use super::reader::BatchReader;
use super::record::BatchRecord;

/// Returns the batch log location under `data_dir`.
pub fn batch_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join("batches.log")
}

/// File operations the append path needs.
trait LogSink: Write {
    fn len(&self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LogSink for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Writes one frame at `offset`, the last acknowledged end of log.
///
/// Bytes past `offset` left by an earlier failed append are dropped first.
/// On failure the sink is truncated back to `offset`.
fn append_frame<S: LogSink>(sink: &mut S, offset: u64, frame: &[u8], sync: bool) -> io::Result<()> {
    if sink.len()? != offset {
        sink.truncate(offset)?;
    }

    let written = sink
        .write_all(frame)
        .and_then(|()| if sync { sink.sync() } else { Ok(()) });
    if let Err(e) = written {
        // If this fails too, the next append retries it.
        let _ = sink.truncate(offset);
        return Err(e);
    }
    Ok(())
}

struct WriterState {
    file: File,
    current_offset: u64,
    batch_count: u64,
}

/// Dispatcher appending each batch as one checksummed record.
///
/// Appends are serialized so concurrent inserts never interleave bytes.
pub struct FileDispatcher {
    path: PathBuf,
    sync_writes: bool,
    state: Mutex<WriterState>,
}

impl FileDispatcher {
    /// Opens or creates the batch log under `data_dir`.
    ///
    /// Existing records are scanned once; a damaged log refuses to open.
    ///
    /// # Errors
    ///
    /// - `INGEST_STORAGE_WRITE_FAILED` if the file cannot be created or opened
    /// - `INGEST_DATA_CORRUPTION` if an existing record fails verification
    pub fn open(data_dir: &Path, sync_writes: bool) -> StorageResult<Self> {
        let path = batch_log_path(data_dir);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open batch log: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        let batch_count = if current_offset == 0 {
            0
        } else {
            let mut reader = BatchReader::open(&path)?;
            let mut count = 0;
            while reader.read_next()?.is_some() {
                count += 1;
            }
            count
        };

        Ok(Self {
            path,
            sync_writes,
            state: Mutex::new(WriterState {
                file,
                current_offset,
                batch_count,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync_writes(&self) -> bool {
        self.sync_writes
    }

    /// Returns the number of batches in the log.
    pub fn batch_count(&self) -> u64 {
        self.state.lock().map(|s| s.batch_count).unwrap_or(0)
    }

    /// Returns the current end-of-log offset.
    pub fn current_offset(&self) -> u64 {
        self.state.lock().map(|s| s.current_offset).unwrap_or(0)
    }

    /// Appends `batch` and returns the byte offset it was written at.
    pub fn append(&self, batch: &BatchRecord) -> StorageResult<u64> {
        let serialized = batch.serialize()?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::dispatch_failed("batch log lock poisoned"))?;
        let offset = state.current_offset;

        append_frame(&mut state.file, offset, &serialized, self.sync_writes).map_err(|e| {
            StorageError::write_failed(format!("Failed to append batch: {}", batch.batch_id), e)
        })?;

        state.current_offset += serialized.len() as u64;
        state.batch_count += 1;

        Ok(offset)
    }
}

impl PersistenceDispatcher for FileDispatcher {
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()> {
        let batch = BatchRecord::new(entity_name, records.to_vec(), tracking_id);
        self.append(&batch).map(|_| ())
    }
}

impl std::fmt::Debug for FileDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDispatcher")
            .field("path", &self.path)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = FileDispatcher::open(temp_dir.path(), true).unwrap();

        assert!(temp_dir.path().join("data").is_dir());
        assert!(dispatcher.path().exists());
        assert_eq!(dispatcher.batch_count(), 0);
        assert_eq!(dispatcher.current_offset(), 0);
    }

    #[test]
    fn test_append_returns_offsets() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = FileDispatcher::open(temp_dir.path(), true).unwrap();

        let first = BatchRecord::new("school", vec![json!({ "school_id": 1 })], 7);
        let second = BatchRecord::new("school", vec![json!({ "school_id": 2 })], 7);
        let first_len = first.serialize().unwrap().len() as u64;

        assert_eq!(dispatcher.append(&first).unwrap(), 0);
        assert_eq!(dispatcher.append(&second).unwrap(), first_len);
        assert_eq!(dispatcher.batch_count(), 2);
    }

    #[test]
    fn test_reopen_counts_existing_batches() {
        let temp_dir = TempDir::new().unwrap();
        {
            let dispatcher = FileDispatcher::open(temp_dir.path(), false).unwrap();
            dispatcher.insert("school", &[json!({})], 1).unwrap();
            dispatcher.insert("school", &[json!({})], 2).unwrap();
        }

        let dispatcher = FileDispatcher::open(temp_dir.path(), true).unwrap();
        assert_eq!(dispatcher.batch_count(), 2);

        dispatcher.insert("district", &[], 3).unwrap();
        let batches = BatchReader::open(dispatcher.path()).unwrap().read_all().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].entity_name, "district");
    }

    /// Accepts `capacity` bytes in total, then fails every write.
    struct ShortSink {
        bytes: Vec<u8>,
        capacity: usize,
        fail_sync: bool,
    }

    impl ShortSink {
        fn with_prefix(prefix: &[u8], capacity: usize) -> Self {
            Self {
                bytes: prefix.to_vec(),
                capacity,
                fail_sync: false,
            }
        }
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.bytes.len());
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = room.min(buf.len());
            self.bytes.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogSink for ShortSink {
        fn len(&self) -> io::Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.bytes.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            if self.fail_sync {
                return Err(io::Error::new(io::ErrorKind::Other, "fsync failed"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_torn_write_rewound() {
        let mut sink = ShortSink::with_prefix(b"0123456789", 15);

        let err = append_frame(&mut sink, 10, &[7u8; 20], false).unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert_eq!(sink.bytes, b"0123456789");
    }

    #[test]
    fn test_failed_sync_rewound() {
        let mut sink = ShortSink::with_prefix(b"0123", 1024);
        sink.fail_sync = true;

        assert!(append_frame(&mut sink, 4, b"frame", true).is_err());
        assert_eq!(sink.bytes, b"0123");

        sink.fail_sync = false;
        append_frame(&mut sink, 4, b"frame", true).unwrap();
        assert_eq!(sink.bytes, b"0123frame");
    }

    #[test]
    fn test_stale_tail_dropped_before_append() {
        let mut sink = ShortSink::with_prefix(b"0123xyz", 1024);

        append_frame(&mut sink, 4, b"frame", false).unwrap();
        assert_eq!(sink.bytes, b"0123frame");
    }

    #[test]
    fn test_open_refuses_corrupt_log() {
        let temp_dir = TempDir::new().unwrap();
        {
            let dispatcher = FileDispatcher::open(temp_dir.path(), true).unwrap();
            dispatcher.insert("school", &[json!({ "a": 1 })], 1).unwrap();
        }
        let path = batch_log_path(temp_dir.path());
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let err = FileDispatcher::open(temp_dir.path(), true).unwrap_err();
        assert_eq!(err.code(), "INGEST_DATA_CORRUPTION");
    }
}
