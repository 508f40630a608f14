use std::path::PathBuf;

use thiserror::Error;

use crate::store::detail::DetailKind;
use crate::types::{ContentVersion, TableKind, UnknownTable};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Snapshot manifest not found at {0}")]
    ManifestMissing(PathBuf),
    #[error("Output directory already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Duplicate table in snapshot input: {0}")]
    DuplicateTable(TableKind),
    #[error("Invalid {kind:?} detail key: {key:?}")]
    InvalidDetailKey { kind: DetailKind, key: String },
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),
}

/// Failure to produce a whole table. Other tables are unaffected.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    UnknownTable(#[from] UnknownTable),
    #[error("Table {0} has no source file in this snapshot")]
    MissingTable(TableKind),
    #[error("Table {kind} is corrupt: {reason}")]
    Corrupt { kind: TableKind, reason: String },
    #[error("Table {kind} content hashes to {actual}, manifest says {expected}")]
    VersionMismatch {
        kind: TableKind,
        expected: ContentVersion,
        actual: ContentVersion,
    },
    #[error("IO error reading table {kind}: {source}")]
    Io {
        kind: TableKind,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Unknown detail kind: {0:?}")]
    UnknownKind(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Detail record {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
