//! Persistence dispatch seam
//!
//! The pipeline hands every accepted batch to a `PersistenceDispatcher`
//! exactly once. Whatever the dispatcher returns as an error is propagated
//! to the caller unchanged.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::errors::{StorageError, StorageResult};

/// Destination for accepted batches.
pub trait PersistenceDispatcher: Send + Sync {
    /// Persists `records` as one batch for `entity_name`.
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()>;
}

impl<D: PersistenceDispatcher + ?Sized> PersistenceDispatcher for &D {
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()> {
        (**self).insert(entity_name, records, tracking_id)
    }
}

impl<D: PersistenceDispatcher + ?Sized> PersistenceDispatcher for Arc<D> {
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()> {
        (**self).insert(entity_name, records, tracking_id)
    }
}

impl<D: PersistenceDispatcher + ?Sized> PersistenceDispatcher for Box<D> {
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()> {
        (**self).insert(entity_name, records, tracking_id)
    }
}

/// One recorded call to `MemoryDispatcher::insert`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertCall {
    pub entity_name: String,
    pub records: Vec<Value>,
    pub tracking_id: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    inserts: Vec<InsertCall>,
    failure: Option<String>,
}

/// Dispatcher keeping batches in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryDispatcher {
    state: Mutex<MemoryState>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every insert received so far, in order.
    pub fn inserts(&self) -> Vec<InsertCall> {
        self.state
            .lock()
            .map(|s| s.inserts.clone())
            .unwrap_or_default()
    }

    pub fn insert_count(&self) -> usize {
        self.state.lock().map(|s| s.inserts.len()).unwrap_or(0)
    }

    /// Makes subsequent inserts fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = message;
        }
    }
}

impl PersistenceDispatcher for MemoryDispatcher {
    fn insert(&self, entity_name: &str, records: &[Value], tracking_id: i64) -> StorageResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::dispatch_failed("dispatcher lock poisoned"))?;

        if let Some(message) = state.failure.as_ref() {
            return Err(StorageError::dispatch_failed(message.clone()));
        }

        state.inserts.push(InsertCall {
            entity_name: entity_name.to_string(),
            records: records.to_vec(),
            tracking_id,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_dispatcher_records_inserts() {
        let dispatcher = MemoryDispatcher::new();
        dispatcher
            .insert("school", &[json!({ "school_id": "6677" })], 11)
            .unwrap();

        assert_eq!(
            dispatcher.inserts(),
            vec![InsertCall {
                entity_name: "school".into(),
                records: vec![json!({ "school_id": "6677" })],
                tracking_id: 11,
            }]
        );
    }

    #[test]
    fn test_memory_dispatcher_failure() {
        let dispatcher = MemoryDispatcher::new();
        dispatcher.set_failure(Some("exception test".into()));

        let err = dispatcher.insert("school", &[], 0).unwrap_err();
        assert_eq!(err.to_string(), "exception test");
        assert_eq!(dispatcher.insert_count(), 0);

        dispatcher.set_failure(None);
        dispatcher.insert("school", &[], 0).unwrap();
        assert_eq!(dispatcher.insert_count(), 1);
    }

    #[test]
    fn test_shared_dispatcher() {
        let dispatcher = Arc::new(MemoryDispatcher::new());
        let shared: Box<dyn PersistenceDispatcher> = Box::new(Arc::clone(&dispatcher));
        shared.insert("district", &[json!(1)], 2).unwrap();
        assert_eq!(dispatcher.insert_count(), 1);
    }
}
