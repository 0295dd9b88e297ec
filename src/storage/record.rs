//! Batch log record format
//!
//! Each accepted batch becomes one record:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, includes itself and checksum)
//! +------------------+
//! | Batch ID         | (length-prefixed string, UUID)
//! +------------------+
//! | Entity Name      | (length-prefixed string)
//! +------------------+
//! | Tracking ID      | (i64 LE)
//! +------------------+
//! | Ingested At      | (length-prefixed string, RFC 3339)
//! +------------------+
//! | Record Count     | (u32 LE)
//! +------------------+
//! | Payload          | (length-prefixed bytes, JSON array)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Cursor, Read};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::checksum::compute_checksum;
use super::errors::{StorageError, StorageResult};

/// len + 3 strings + tracking id + count + payload + checksum
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 8 + 4 + 4 + 4 + 4;

/// One persisted batch of accepted records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub batch_id: Uuid,
    pub entity_name: String,
    pub tracking_id: i64,
    pub ingested_at: DateTime<Utc>,
    pub records: Vec<Value>,
}

impl BatchRecord {
    /// Creates a batch stamped with a fresh id and the current time.
    pub fn new(entity_name: impl Into<String>, records: Vec<Value>, tracking_id: i64) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            entity_name: entity_name.into(),
            tracking_id,
            ingested_at: Utc::now(),
            records,
        }
    }

    fn serialize_body(&self) -> StorageResult<Vec<u8>> {
        let payload = serde_json::to_vec(&self.records)
            .map_err(|e| StorageError::EncodeFailed(e.to_string()))?;
        let record_count = u32::try_from(self.records.len())
            .map_err(|_| StorageError::EncodeFailed("too many records in batch".into()))?;

        let mut buf = Vec::with_capacity(payload.len() + 96);
        write_bytes(&mut buf, self.batch_id.to_string().as_bytes());
        write_bytes(&mut buf, self.entity_name.as_bytes());
        buf.extend_from_slice(&self.tracking_id.to_le_bytes());
        write_bytes(&mut buf, self.ingested_at.to_rfc3339().as_bytes());
        buf.extend_from_slice(&record_count.to_le_bytes());
        write_bytes(&mut buf, &payload);
        Ok(buf)
    }

    /// Serializes the complete record, length prefix and checksum included.
    pub fn serialize(&self) -> StorageResult<Vec<u8>> {
        let body = self.serialize_body()?;
        let record_length = u32::try_from(4 + body.len() + 4)
            .map_err(|_| StorageError::EncodeFailed("batch exceeds record size limit".into()))?;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);
        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        Ok(record)
    }

    /// Deserializes a record from the front of `data`, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(invalid(io::ErrorKind::UnexpectedEof, "Record too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if record_length < MIN_RECORD_SIZE {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }
        if data.len() < record_length {
            return Err(invalid(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);
        if computed_checksum != stored_checksum {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = Cursor::new(&data[4..checksum_offset]);

        let batch_id = Uuid::parse_str(&read_string(&mut cursor)?)
            .map_err(|e| invalid(io::ErrorKind::InvalidData, format!("Invalid batch id: {}", e)))?;
        let entity_name = read_string(&mut cursor)?;

        let mut tracking_buf = [0u8; 8];
        cursor.read_exact(&mut tracking_buf)?;
        let tracking_id = i64::from_le_bytes(tracking_buf);

        let ingested_at = DateTime::parse_from_rfc3339(&read_string(&mut cursor)?)
            .map_err(|e| invalid(io::ErrorKind::InvalidData, format!("Invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        let mut count_buf = [0u8; 4];
        cursor.read_exact(&mut count_buf)?;
        let record_count = u32::from_le_bytes(count_buf) as usize;

        let payload = read_bytes(&mut cursor)?;
        let records: Vec<Value> = serde_json::from_slice(&payload)
            .map_err(|e| invalid(io::ErrorKind::InvalidData, format!("Invalid payload: {}", e)))?;
        if records.len() != record_count {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!(
                    "Record count mismatch: header {}, payload {}",
                    record_count,
                    records.len()
                ),
            ));
        }

        Ok((
            Self {
                batch_id,
                entity_name,
                tracking_id,
                ingested_at,
                records,
            },
            record_length,
        ))
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
    String::from_utf8(read_bytes(reader)?)
        .map_err(|e| invalid(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e)))
}

fn invalid(kind: io::ErrorKind, message: impl Into<String>) -> io::Error {
    io::Error::new(kind, message.into())
}
