//! Documentation store collaborators.
//!
//! The engine never owns documentation records; it asks a
//! [`DocumentationStore`] for every reference owner (a documentation entry
//! with the raw source strings it claims to cover) and parses those strings
//! itself. A store failure is never fatal to the engine: the aggregator
//! absorbs it into the vacuous-empty report.
//!
//! Two adapters ship here: [`MemoryStore`] for tests and embedding, and
//! [`JsonStore`] for a reference file on disk.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One documentation entry and the source strings it claims to cover.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceOwner {
    /// Stable identifier of the documentation entry, used in skip logs.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Raw source-reference strings (`"src/a.ts"`, `"src/a.ts:1-10,20-30"`).
    pub sources: Vec<String>,
}

/// Source of documentation reference owners.
pub trait DocumentationStore {
    /// Every reference owner the store knows about.
    ///
    /// An `Err` here means the store is unreachable; the aggregator treats
    /// that as "no documentation exists" and degrades to an empty report
    /// rather than propagating.
    fn all_reference_owners(&self) -> Result<Vec<ReferenceOwner>>;
}

/// In-memory store (useful for testing, embedding, WASM).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    owners: Vec<ReferenceOwner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an owner with its source strings.
    pub fn owner(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        sources: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.owners.push(ReferenceOwner {
            id: id.into(),
            title: title.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl DocumentationStore for MemoryStore {
    fn all_reference_owners(&self) -> Result<Vec<ReferenceOwner>> {
        Ok(self.owners.clone())
    }
}

#[derive(Debug, Deserialize)]
struct OwnersFile {
    owners: Vec<ReferenceOwner>,
}

/// Store backed by a JSON file:
///
/// ```json
/// { "owners": [ { "id": "n1", "title": "API", "sources": ["src/api.ts:1-40"] } ] }
/// ```
///
/// The file is read on every [`all_reference_owners`] call, so a missing or
/// corrupt file surfaces as the store-unreachable degradation, not a
/// construction failure.
///
/// [`all_reference_owners`]: DocumentationStore::all_reference_owners
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentationStore for JsonStore {
    fn all_reference_owners(&self) -> Result<Vec<ReferenceOwner>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Store(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let parsed: OwnersFile = serde_json::from_str(&content)
            .map_err(|e| Error::Store(format!("failed to parse {}: {e}", self.path.display())))?;
        Ok(parsed.owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_builder() {
        let store = MemoryStore::new()
            .owner("n1", "API notes", ["src/api.ts:1-10"])
            .owner("n2", "Util notes", ["src/util.ts"]);
        let owners = store.all_reference_owners().unwrap();
        assert_eq!(owners.len(), 2);
        assert_eq!(owners[0].id, "n1");
        assert_eq!(owners[1].sources, vec!["src/util.ts"]);
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docrefs.json");
        std::fs::write(
            &path,
            r#"{ "owners": [ { "id": "n1", "title": "API", "sources": ["src/api.ts:1-40"] } ] }"#,
        )
        .unwrap();

        let owners = JsonStore::new(&path).all_reference_owners().unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].title, "API");
    }

    #[test]
    fn test_json_store_missing_file_is_store_error() {
        let err = JsonStore::new("/nonexistent/docrefs.json")
            .all_reference_owners()
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_json_store_corrupt_payload_is_store_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docrefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonStore::new(&path).all_reference_owners().unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
