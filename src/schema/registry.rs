//! Schema registry access
//!
//! The registry is an external store keyed by `(kind, entity name)`. A lookup
//! returns zero or one row; the accessor decodes it into a `SchemaDescriptor`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::errors::{RegistryError, RegistryResult};
use super::types::{SchemaDescriptor, SchemaKind};

/// An external store mapping entity names to schema rows.
///
/// `Ok(None)` means "no such entity" and is an expected outcome. `Err` means
/// the store itself failed.
pub trait SchemaRegistry: Send + Sync {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>>;
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for &R {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>> {
        (**self).lookup(kind, entity_name)
    }
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>> {
        (**self).lookup(kind, entity_name)
    }
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Box<R> {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>> {
        (**self).lookup(kind, entity_name)
    }
}

/// Resolves entity names to their active schema.
///
/// Performs exactly one registry lookup per call and caches nothing.
#[derive(Debug, Clone)]
pub struct SchemaAccessor<R> {
    registry: R,
}

impl<R: SchemaRegistry> SchemaAccessor<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Resolves `entity_name` to its schema descriptor.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(descriptor))` if the registry holds a row for the entity
    /// - `Ok(None)` if it does not
    /// - `Err` if the lookup failed or the row cannot be decoded
    pub fn resolve(
        &self,
        kind: SchemaKind,
        entity_name: &str,
    ) -> RegistryResult<Option<SchemaDescriptor>> {
        match self.registry.lookup(kind, entity_name)? {
            Some(row) => SchemaDescriptor::from_row(kind, entity_name, &row).map(Some),
            None => Ok(None),
        }
    }
}

/// In-memory registry for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySchemaRegistry {
    rows: RwLock<HashMap<(SchemaKind, String), Value>>,
    failure: RwLock<Option<String>>,
}

impl MemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw registry row.
    pub fn insert_row(
        &self,
        kind: SchemaKind,
        entity_name: impl Into<String>,
        row: Value,
    ) -> RegistryResult<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RegistryError::lookup_failed("registry lock poisoned"))?;
        rows.insert((kind, entity_name.into()), row);
        Ok(())
    }

    /// Stores `schema` as the active schema of `entity_name`.
    pub fn insert_schema(
        &self,
        kind: SchemaKind,
        entity_name: impl Into<String>,
        schema: Value,
    ) -> RegistryResult<()> {
        let entity_name = entity_name.into();
        let row = SchemaDescriptor::new(entity_name.clone(), schema, kind).to_row();
        self.insert_row(kind, entity_name, row)
    }

    /// Makes every subsequent lookup fail with `message` (or succeed again with `None`).
    pub fn set_failure(&self, message: Option<String>) -> RegistryResult<()> {
        let mut failure = self
            .failure
            .write()
            .map_err(|_| RegistryError::lookup_failed("registry lock poisoned"))?;
        *failure = message;
        Ok(())
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SchemaRegistry for MemorySchemaRegistry {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>> {
        let failure = self
            .failure
            .read()
            .map_err(|_| RegistryError::lookup_failed("registry lock poisoned"))?;
        if let Some(message) = failure.as_ref() {
            return Err(RegistryError::lookup_failed(message.clone()));
        }

        let rows = self
            .rows
            .read()
            .map_err(|_| RegistryError::lookup_failed("registry lock poisoned"))?;
        Ok(rows.get(&(kind, entity_name.to_string())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn school_schema() -> Value {
        json!({ "type": "object", "required": ["dimension_name"] })
    }

    #[test]
    fn test_resolve_registered_schema() {
        let registry = MemorySchemaRegistry::new();
        registry
            .insert_schema(SchemaKind::Dimension, "school", school_schema())
            .unwrap();

        let accessor = SchemaAccessor::new(&registry);
        let descriptor = accessor
            .resolve(SchemaKind::Dimension, "school")
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.entity_name, "school");
        assert_eq!(descriptor.schema, school_schema());
    }

    #[test]
    fn test_resolve_unknown_is_none() {
        let accessor = SchemaAccessor::new(MemorySchemaRegistry::new());
        assert!(accessor
            .resolve(SchemaKind::Dimension, "district")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_kinds_are_separate() {
        let registry = MemorySchemaRegistry::new();
        registry
            .insert_schema(SchemaKind::Event, "school", school_schema())
            .unwrap();

        let accessor = SchemaAccessor::new(&registry);
        assert!(accessor
            .resolve(SchemaKind::Dimension, "school")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_failure_propagates() {
        let registry = MemorySchemaRegistry::new();
        registry.set_failure(Some("exception test".into())).unwrap();

        let err = SchemaAccessor::new(&registry)
            .resolve(SchemaKind::Dimension, "school")
            .unwrap_err();
        assert_eq!(err.to_string(), "exception test");

        registry.set_failure(None).unwrap();
        assert!(SchemaAccessor::new(&registry)
            .resolve(SchemaKind::Dimension, "school")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_row_is_error() {
        let registry = MemorySchemaRegistry::new();
        registry
            .insert_row(SchemaKind::Dimension, "school", json!({ "dimension_data": 0 }))
            .unwrap();

        let err = SchemaAccessor::new(&registry)
            .resolve(SchemaKind::Dimension, "school")
            .unwrap_err();
        assert_eq!(err.code(), "INGEST_REGISTRY_MALFORMED_ENTRY");
    }

    struct CountingRegistry {
        calls: AtomicUsize,
    }

    impl SchemaRegistry for CountingRegistry {
        fn lookup(&self, _kind: SchemaKind, _entity_name: &str) -> RegistryResult<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn test_single_lookup_per_resolve() {
        let registry = CountingRegistry {
            calls: AtomicUsize::new(0),
        };
        let accessor = SchemaAccessor::new(&registry);
        accessor.resolve(SchemaKind::Dimension, "a").unwrap();
        accessor.resolve(SchemaKind::Dimension, "a").unwrap();
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
    }
}
