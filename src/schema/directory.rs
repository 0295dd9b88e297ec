//! Directory-backed schema registry
//!
//! Rows are stored one per file at `<registry_dir>/<kind>/<entity_name>.json`
//! and read on every lookup, so edits on disk are picked up without a restart.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::errors::{RegistryError, RegistryResult};
use super::registry::SchemaRegistry;
use super::types::{SchemaDescriptor, SchemaKind};

/// Registry reading rows from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySchemaRegistry {
    root: PathBuf,
}

impl DirectorySchemaRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the registry root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the per-kind directories.
    pub fn create_layout(&self) -> RegistryResult<()> {
        for kind in SchemaKind::ALL {
            let dir = self.root.join(kind.as_str());
            fs::create_dir_all(&dir).map_err(|source| RegistryError::Io { path: dir, source })?;
        }
        Ok(())
    }

    /// Returns the file a row would live in, or `None` if the name cannot map
    /// to a file inside the registry.
    pub fn entry_path(&self, kind: SchemaKind, entity_name: &str) -> Option<PathBuf> {
        if !is_safe_name(entity_name) {
            return None;
        }
        Some(
            self.root
                .join(kind.as_str())
                .join(format!("{}.json", entity_name)),
        )
    }

    /// Writes `descriptor` as a row file, replacing any previous one.
    pub fn save(&self, descriptor: &SchemaDescriptor) -> RegistryResult<PathBuf> {
        let path = self
            .entry_path(descriptor.schema_kind, &descriptor.entity_name)
            .ok_or_else(|| {
                RegistryError::malformed(&descriptor.entity_name, "entity name is not a valid file name")
            })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RegistryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(&descriptor.to_row())
            .map_err(|e| RegistryError::malformed(&descriptor.entity_name, e.to_string()))?;
        fs::write(&path, content).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

impl SchemaRegistry for DirectorySchemaRegistry {
    fn lookup(&self, kind: SchemaKind, entity_name: &str) -> RegistryResult<Option<Value>> {
        let Some(path) = self.entry_path(kind, entity_name) else {
            return Ok(None);
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(RegistryError::Io { path, source }),
        };

        let row = serde_json::from_str(&content)
            .map_err(|e| RegistryError::malformed(entity_name, format!("invalid JSON: {}", e)))?;
        Ok(Some(row))
    }
}

/// Names must be a single, non-hidden path component.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(&['/', '\\', '\0'][..])
        && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaAccessor;
    use serde_json::json;
    use tempfile::TempDir;

    fn school_descriptor() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "school",
            json!({ "type": "object", "required": ["dimension"] }),
            SchemaKind::Dimension,
        )
    }

    #[test]
    fn test_save_and_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let registry = DirectorySchemaRegistry::new(temp_dir.path());

        let path = registry.save(&school_descriptor()).unwrap();
        assert!(path.ends_with("dimension/school.json"));

        let resolved = SchemaAccessor::new(&registry)
            .resolve(SchemaKind::Dimension, "school")
            .unwrap();
        assert_eq!(resolved, Some(school_descriptor()));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let registry = DirectorySchemaRegistry::new(temp_dir.path());
        registry.create_layout().unwrap();

        assert!(registry.lookup(SchemaKind::Dimension, "district").unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let registry = DirectorySchemaRegistry::new(temp_dir.path());
        registry.create_layout().unwrap();
        fs::write(temp_dir.path().join("dimension").join("school.json"), "{ not json").unwrap();

        let err = registry.lookup(SchemaKind::Dimension, "school").unwrap_err();
        assert_eq!(err.code(), "INGEST_REGISTRY_MALFORMED_ENTRY");
    }

    #[test]
    fn test_unsafe_names_never_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let registry = DirectorySchemaRegistry::new(temp_dir.path());

        for name in ["../school", "a/b", "..", ".hidden", "a\\b"] {
            assert!(registry.entry_path(SchemaKind::Dimension, name).is_none());
            assert!(registry.lookup(SchemaKind::Dimension, name).unwrap().is_none());
        }
    }

    #[test]
    fn test_create_layout() {
        let temp_dir = TempDir::new().unwrap();
        let registry = DirectorySchemaRegistry::new(temp_dir.path().join("schemas"));
        registry.create_layout().unwrap();

        for kind in SchemaKind::ALL {
            assert!(registry.root().join(kind.as_str()).is_dir());
        }
    }
}
