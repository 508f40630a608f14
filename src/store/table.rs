use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::format::slugify;
use crate::types::{AggregateRow, ContentVersion, DimValue, RowKey, TableKind};

/// A row that was read but not loaded. Skipping is per row; the table
/// still loads, and the report makes the loss visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RowIssue {
    Malformed { index: usize, reason: String },
    /// The first row with this key was kept.
    DuplicateKey {
        index: usize,
        first_index: usize,
        key: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub issues: Vec<RowIssue>,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.issues.len()
    }

    pub fn malformed(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, RowIssue::Malformed { .. }))
            .count()
    }

    pub fn duplicates(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, RowIssue::DuplicateKey { .. }))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// An immutable, keyed collection of rows sharing one key shape.
///
/// Totals are computed once at construction; a table is never mutated
/// after that.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    kind: TableKind,
    version: Option<ContentVersion>,
    rows: Vec<AggregateRow>,
    index: HashMap<Vec<DimValue>, usize>,
    columns: BTreeSet<String>,
    total_amount: f64,
    total_payments: u64,
    report: LoadReport,
}

impl AggregateTable {
    /// Build a table from already-typed rows, e.g. in tests or when a host
    /// assembles a table in memory.
    ///
    /// Rows missing a key dimension, or repeating an earlier key, are skipped
    /// and recorded in the report exactly as the file loader does.
    pub fn from_rows(kind: TableKind, rows: Vec<AggregateRow>) -> Self {
        let report = LoadReport {
            rows_read: rows.len(),
            ..LoadReport::default()
        };
        let indexed = rows.into_iter().enumerate().collect();
        Self::assemble(kind, None, indexed, report)
    }

    /// `rows` pairs each row with its position in the source file so issues
    /// can point back at it.
    pub(crate) fn assemble(
        kind: TableKind,
        version: Option<ContentVersion>,
        rows: Vec<(usize, AggregateRow)>,
        mut report: LoadReport,
    ) -> Self {
        let shape = kind.key_shape();
        let mut kept: Vec<AggregateRow> = Vec::with_capacity(rows.len());
        let mut index: HashMap<Vec<DimValue>, usize> = HashMap::with_capacity(rows.len());
        let mut first_seen: HashMap<Vec<DimValue>, usize> = HashMap::with_capacity(rows.len());

        for (source_index, mut row) in rows {
            let Some(key) = row.key.project(shape) else {
                report.issues.push(RowIssue::Malformed {
                    index: source_index,
                    reason: format!("missing key field ({})", row.key.describe(shape)),
                });
                continue;
            };

            if let Some(first_index) = first_seen.get(&key) {
                report.issues.push(RowIssue::DuplicateKey {
                    index: source_index,
                    first_index: *first_index,
                    key: row.key.describe(shape),
                });
                continue;
            }

            row.ordinal = kept.len();
            first_seen.insert(key.clone(), source_index);
            index.insert(key, kept.len());
            kept.push(row);
        }

        report.issues.sort_by_key(|issue| match issue {
            RowIssue::Malformed { index, .. } | RowIssue::DuplicateKey { index, .. } => *index,
        });
        report.rows_loaded = kept.len();

        let columns = kept
            .iter()
            .flat_map(|row| row.columns.keys().cloned())
            .collect();
        let total_amount = kept.iter().map(|row| row.amount).sum();
        let total_payments = kept.iter().map(|row| row.payments).sum();

        Self {
            kind,
            version,
            rows: kept,
            index,
            columns,
            total_amount,
            total_payments,
            report,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn version(&self) -> Option<&ContentVersion> {
        self.version.as_ref()
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregateRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of `amount` over every loaded row, computed at load.
    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn total_payments(&self) -> u64 {
        self.total_payments
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Row whose key, projected onto this table's shape, equals `key`'s.
    pub fn get(&self, key: &RowKey) -> Option<&AggregateRow> {
        let projected = key.project(self.kind.key_shape())?;
        self.index.get(&projected).map(|&i| &self.rows[i])
    }

    /// First row (in table order) whose lookup key equals `slugify(key)`.
    /// Distinct names that slug identically resolve to the earliest row.
    pub fn find_by_slug(&self, key: &str) -> Option<&AggregateRow> {
        let wanted = slugify(key);
        self.rows.iter().find(|row| row.lookup_key() == wanted)
    }
}
