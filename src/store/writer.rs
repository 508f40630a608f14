use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::store::detail::DetailKind;
use crate::store::error::SnapshotError;
use crate::store::manifest::{ManifestTableEntry, SnapshotConfig, SnapshotManifest, MANIFEST_FILE};
use crate::types::{ContentVersion, TableKind};

/// Already-reduced tables and detail records to package as a snapshot.
///
/// Rows are kept as raw JSON so the snapshot holds exactly what the producer
/// emitted; validation happens when the store loads it.
#[derive(Debug, Clone, Default)]
pub struct SnapshotInput {
    tables: Vec<(TableKind, Vec<serde_json::Value>)>,
    details: Vec<(DetailKind, String, serde_json::Value)>,
}

impl SnapshotInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, kind: TableKind, rows: Vec<serde_json::Value>) -> Self {
        self.tables.push((kind, rows));
        self
    }

    pub fn detail(mut self, kind: DetailKind, key: impl Into<String>, record: serde_json::Value) -> Self {
        self.details.push((kind, key.into(), record));
        self
    }
}

/// Packages a `SnapshotInput` into a snapshot directory.
///
/// Output is a function of the input alone, apart from `created_at`: tables
/// and detail records are written in sorted order and both feed the snapshot
/// version.
pub struct SnapshotWriter {
    config: SnapshotConfig,
}

impl SnapshotWriter {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    pub fn write(
        &self,
        input: SnapshotInput,
        output_dir: &Path,
    ) -> Result<SnapshotManifest, SnapshotError> {
        if output_dir.exists() {
            return Err(SnapshotError::OutputExists(output_dir.to_path_buf()));
        }

        // 1. Sort tables by kind so the snapshot version is order independent
        let mut tables = input.tables;
        tables.sort_by_key(|(kind, _)| *kind);

        for pair in tables.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(SnapshotError::DuplicateTable(pair[0].0));
            }
        }

        // 2. Serialize tables and compute content versions
        // snapshot version covers config, then "<table>:<version>" per table
        let mut version_hasher = Sha256::new();
        let config_json = serde_json::to_vec(&self.config)?;
        version_hasher.update(&config_json);

        let mut serialized = Vec::with_capacity(tables.len());
        let mut entries = Vec::with_capacity(tables.len());
        for (kind, rows) in &tables {
            let bytes = serde_json::to_vec_pretty(rows)?;
            let version = ContentVersion::from_content(&bytes);

            let line = format!("{}:{}", kind.name(), version.as_str());
            version_hasher.update(line.as_bytes());

            let entry = ManifestTableEntry {
                table: *kind,
                version,
                file: kind.file_path(),
                rows: rows.len(),
            };
            serialized.push((entry.file.clone(), bytes));
            entries.push(entry);
        }

        // 3. Merge detail records by normalized key; a later record for the
        // same key replaces the earlier one
        let mut merged: BTreeMap<(DetailKind, String), serde_json::Value> = BTreeMap::new();
        for (kind, key, record) in input.details {
            let normalized = kind
                .normalize_key(&key)
                .ok_or_else(|| SnapshotError::InvalidDetailKey { kind, key: key.clone() })?;
            merged.insert((kind, normalized), record);
        }

        // then "details/<dir>/<key>:<version>" per record, in key order
        let mut details = Vec::with_capacity(merged.len());
        let mut detail_counts: BTreeMap<String, usize> = BTreeMap::new();
        for ((kind, key), record) in merged {
            let bytes = serde_json::to_vec_pretty(&record)?;
            let version = ContentVersion::from_content(&bytes);
            let line = format!("details/{}/{}:{}", kind.dir_name(), key, version.as_str());
            version_hasher.update(line.as_bytes());

            *detail_counts.entry(kind.dir_name().to_string()).or_default() += 1;
            details.push((kind, key, bytes));
        }

        let hash_bytes = version_hasher.finalize();
        let snapshot_version = format!("sha256:{}", hex::encode(hash_bytes));

        // 4. Manifest; created_at is left out of the snapshot version
        let manifest = SnapshotManifest {
            snapshot_version: snapshot_version.clone(),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            table_count: entries.len(),
            tables: entries,
            details: detail_counts,
        };

        // 5. Write to a temp dir next to the target, named after the version
        let fragment = snapshot_version
            .strip_prefix("sha256:")
            .and_then(|digest| digest.get(..12))
            .ok_or_else(|| SnapshotError::InvalidVersionFormat(snapshot_version.clone()))?;
        let temp_dir = output_dir.with_extension(format!("tmp.{fragment}"));

        // leftover from an interrupted write of the same snapshot
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(temp_dir.join("tables"))?;
        for kind in DetailKind::ALL {
            fs::create_dir_all(temp_dir.join("details").join(kind.dir_name()))?;
        }

        for (file, bytes) in &serialized {
            let mut f = fs::File::create(temp_dir.join(file))?;
            f.write_all(bytes)?;
            f.sync_all()?;
        }

        for (kind, key, bytes) in &details {
            let mut f = fs::File::create(kind.path(&temp_dir, key))?;
            f.write_all(bytes)?;
            f.sync_all()?;
        }

        let f_man = fs::File::create(temp_dir.join(MANIFEST_FILE))?;
        serde_json::to_writer_pretty(&f_man, &manifest)?;
        f_man.sync_all()?;

        // 6. Publish
        fs::rename(&temp_dir, output_dir)?;

        info!(
            output = %output_dir.display(),
            snapshot = %manifest.snapshot_version,
            tables = manifest.table_count,
            details = details.len(),
            "wrote aggregate snapshot"
        );

        Ok(manifest)
    }
}
