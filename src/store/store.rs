// Runtime reads only:
// no mutation of a loaded table
// no invalidation path
// a table is read from disk at most once per store

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::store::detail::{read_detail, Detail, DetailKind, Lookup};
use crate::store::error::{DetailError, SnapshotError, TableError};
use crate::store::loader::parse_versioned;
use crate::store::manifest::SnapshotManifest;
use crate::store::table::AggregateTable;
use crate::types::{ContentVersion, TableKind};

/// Where query and search code get their tables from.
pub trait TableSource {
    fn table(&self, kind: TableKind) -> Result<Arc<AggregateTable>, TableError>;
}

/// Explicit, per-process snapshot handle. Construct once, share by reference.
///
/// Each table loads lazily on first request and is memoized for the life of
/// the store. Loads are independent: one table failing leaves the others
/// usable, and a failed load is not cached, so it fails again on the next
/// request rather than returning stale state.
#[derive(Debug)]
pub struct AggregateStore {
    root: PathBuf,
    manifest: SnapshotManifest,
    config: StoreConfig,
    tables: RwLock<HashMap<TableKind, Arc<AggregateTable>>>,
}

impl AggregateStore {
    pub fn open(root: impl Into<PathBuf>, config: StoreConfig) -> Result<Self, SnapshotError> {
        let root = root.into();
        let manifest = SnapshotManifest::read(&root)?;
        info!(
            root = %root.display(),
            snapshot = %manifest.snapshot_version,
            tables = manifest.table_count,
            "opened aggregate snapshot"
        );
        Ok(Self {
            root,
            manifest,
            config,
            tables: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &SnapshotManifest {
        &self.manifest
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// `getTable(name)`.
    pub fn table_by_name(&self, name: &str) -> Result<Arc<AggregateTable>, TableError> {
        let kind: TableKind = name.parse()?;
        self.table(kind)
    }

    pub fn is_loaded(&self, kind: TableKind) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }

    /// `getDetail(kind, key)`. Unknown keys are `Lookup::NotFound`.
    pub fn detail(&self, kind: DetailKind, key: &str) -> Result<Lookup<Detail>, DetailError> {
        let lookup = read_detail(&self.root, kind, key)?;
        if !lookup.is_found() {
            debug!(kind = ?kind, key, "detail record not found");
        }
        Ok(lookup)
    }

    /// Memoized table load.
    pub fn table(&self, kind: TableKind) -> Result<Arc<AggregateTable>, TableError> {
        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
        {
            return Ok(Arc::clone(table));
        }

        let loaded = Arc::new(self.load(kind)?);

        // Two first requests may race; the first insert wins and both callers
        // get the same table back.
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.entry(kind).or_insert(loaded);
        Ok(Arc::clone(table))
    }

    fn load(&self, kind: TableKind) -> Result<AggregateTable, TableError> {
        let entry = self
            .manifest
            .table(kind)
            .ok_or(TableError::MissingTable(kind))?;
        let path = self.root.join(&entry.file);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(TableError::MissingTable(kind)),
            Err(source) => return Err(TableError::Io { kind, source }),
        };

        let version = ContentVersion::from_content(&bytes);
        if self.config.verify_versions && version != entry.version {
            return Err(TableError::VersionMismatch {
                kind,
                expected: entry.version.clone(),
                actual: version,
            });
        }

        let table = parse_versioned(kind, &bytes, Some(version))?;
        info!(
            table = %kind,
            rows = table.len(),
            skipped = table.report().skipped(),
            "loaded aggregate table"
        );
        Ok(table)
    }
}

impl TableSource for AggregateStore {
    fn table(&self, kind: TableKind) -> Result<Arc<AggregateTable>, TableError> {
        AggregateStore::table(self, kind)
    }
}

impl TableSource for HashMap<TableKind, Arc<AggregateTable>> {
    fn table(&self, kind: TableKind) -> Result<Arc<AggregateTable>, TableError> {
        self.get(&kind)
            .cloned()
            .ok_or(TableError::MissingTable(kind))
    }
}
