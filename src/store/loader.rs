use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::store::error::TableError;
use crate::store::table::{AggregateTable, LoadReport, RowIssue};
use crate::types::{AggregateRow, ContentVersion, Fips, RowKey, StateCode, TableKind};

/// FIPS codes show up both quoted and as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(u64),
}

impl TextOrNumber {
    fn into_string(self) -> String {
        match self {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Wire shape of one table row. Any field not named here that holds a
/// number becomes a precomputed metric column.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    fips: Option<TextOrNumber>,
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    recipient: Option<String>,
    #[serde(default, alias = "entityType")]
    entity_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(alias = "totalAmount")]
    amount: f64,
    #[serde(alias = "paymentCount")]
    payments: u64,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl RawRow {
    fn into_row(self) -> Result<AggregateRow, String> {
        if !self.amount.is_finite() {
            return Err(format!("amount is not finite: {}", self.amount));
        }

        let state = non_blank(self.state)
            .map(|s| StateCode::parse(&s))
            .transpose()
            .map_err(|e| e.to_string())?;
        let fips = self
            .fips
            .map(|f| Fips::parse(&f.into_string()))
            .transpose()
            .map_err(|e| e.to_string())?;

        let key = RowKey {
            year: self.year,
            state,
            county: non_blank(self.county),
            fips,
            program: non_blank(self.program),
            recipient: non_blank(self.recipient),
            entity_type: non_blank(self.entity_type),
        };

        let columns = self
            .extra
            .into_iter()
            .filter_map(|(column, value)| {
                value
                    .as_f64()
                    .filter(|v| v.is_finite())
                    .map(|v| (column, v))
            })
            .collect();

        Ok(AggregateRow {
            key,
            name: non_blank(self.name),
            code: non_blank(self.code),
            amount: self.amount,
            payments: self.payments,
            columns,
            ordinal: 0,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a serialized table: a JSON array of row objects.
///
/// Rows that fail to parse, miss a key field, or repeat a key are skipped and
/// recorded in the table's `LoadReport`. Input that is not an array at all,
/// or a non-empty array in which no row survives, fails the whole table.
pub fn parse_table(kind: TableKind, bytes: &[u8]) -> Result<AggregateTable, TableError> {
    parse_versioned(kind, bytes, None)
}

pub(crate) fn parse_versioned(
    kind: TableKind,
    bytes: &[u8],
    version: Option<ContentVersion>,
) -> Result<AggregateTable, TableError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| TableError::Corrupt {
            kind,
            reason: e.to_string(),
        })?;

    let mut report = LoadReport {
        rows_read: values.len(),
        ..LoadReport::default()
    };
    let mut rows = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawRow>(value)
            .map_err(|e| e.to_string())
            .and_then(RawRow::into_row);
        match parsed {
            Ok(row) => rows.push((index, row)),
            Err(reason) => report.issues.push(RowIssue::Malformed { index, reason }),
        }
    }

    let table = AggregateTable::assemble(kind, version, rows, report);
    let report = table.report();

    if report.rows_read > 0 && report.rows_loaded == 0 {
        return Err(TableError::Corrupt {
            kind,
            reason: format!("none of {} rows could be loaded", report.rows_read),
        });
    }

    if !report.is_clean() {
        warn!(
            table = %kind,
            rows_read = report.rows_read,
            malformed = report.malformed(),
            duplicates = report.duplicates(),
            "skipped rows while loading table"
        );
    }

    Ok(table)
}
