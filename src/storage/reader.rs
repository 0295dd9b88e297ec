//! Batch log reader with strict corruption detection
//!
//! Every read validates the record checksum. A checksum failure, a truncated
//! tail or an undecodable body aborts the scan with the offending offset.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{BatchRecord, MIN_RECORD_SIZE};
use super::writer::batch_log_path;

/// Sequential reader over the batch log.
pub struct BatchReader {
    path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl BatchReader {
    /// Opens the batch log for reading.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path).map_err(|e| {
            StorageError::read_failed(format!("Failed to open batch log: {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Opens `<data_dir>/data/batches.log`.
    pub fn open_from_data_dir(data_dir: &Path) -> StorageResult<Self> {
        Self::open(&batch_log_path(data_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    pub fn has_more(&self) -> bool {
        self.current_offset < self.file_size
    }

    /// Reads the next batch.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(batch))` if a batch was read
    /// - `Ok(None)` at end of file
    /// - `Err(INGEST_DATA_CORRUPTION)` if the record is damaged (FATAL)
    pub fn read_next(&mut self) -> StorageResult<Option<BatchRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated batch log: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }
        if record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (batch, consumed) = BatchRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;
        self.current_offset += consumed as u64;

        Ok(Some(batch))
    }

    /// Reads every remaining batch. Any corruption fails the whole scan.
    pub fn read_all(&mut self) -> StorageResult<Vec<BatchRecord>> {
        let mut batches = Vec::new();
        while let Some(batch) = self.read_next()? {
            batches.push(batch);
        }
        Ok(batches)
    }

    /// Rewinds to the start of the log.
    pub fn reset(&mut self) -> StorageResult<()> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| StorageError::read_failed("Failed to seek to start of batch log", e))?;
        self.current_offset = 0;
        Ok(())
    }
}
