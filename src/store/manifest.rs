use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::store::error::SnapshotError;
use crate::types::{ContentVersion, TableKind};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotConfig {
    pub version: String,
    pub hash_algorithm: String,
}

impl SnapshotConfig {
    pub fn v0() -> Self {
        Self {
            version: "1".into(),
            hash_algorithm: "sha256".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestTableEntry {
    pub table: TableKind,
    pub version: ContentVersion,
    pub file: String,
    /// Rows as written, before load-time validation.
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotManifest {
    pub snapshot_version: String,
    pub build_config: SnapshotConfig,
    pub created_at: DateTime<Utc>, // informational only
    pub table_count: usize,
    pub tables: Vec<ManifestTableEntry>,
    /// Detail record count per detail directory.
    #[serde(default)]
    pub details: BTreeMap<String, usize>,
}

impl SnapshotManifest {
    pub fn read(root: &Path) -> Result<Self, SnapshotError> {
        let path = root.join(MANIFEST_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SnapshotError::ManifestMissing(path))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn table(&self, kind: TableKind) -> Option<&ManifestTableEntry> {
        self.tables.iter().find(|entry| entry.table == kind)
    }
}
