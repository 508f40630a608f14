use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::catalog::{Dimension, TableKind};
use crate::types::rows::AggregateRow;

/// A sortable, rankable quantity of a row.
///
/// `Column` names a precomputed metric column supplied with the table
/// (per-capita, dependency ratio). Whether it exists is checked against the
/// table at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    Amount,
    Payments,
    /// `amount / payments`, 0 when there are no payments.
    Average,
    Column(String),
}

impl Metric {
    pub fn name(&self) -> &str {
        match self {
            Metric::Amount => "amount",
            Metric::Payments => "payments",
            Metric::Average => "average",
            Metric::Column(c) => c,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "amount" | "totalAmount" => Ok(Metric::Amount),
            "payments" | "paymentCount" | "payment_count" => Ok(Metric::Payments),
            "average" | "averagePayment" => Ok(Metric::Average),
            "" => Err(QueryError::UnknownMetric(s.to_string())),
            column => Ok(Metric::Column(column.to_string())),
        }
    }
}

impl TryFrom<String> for Metric {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl FromStr for Direction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            _ => Err(QueryError::InvalidDirection(s.to_string())),
        }
    }
}

/// One clause of a filter. A filter is the conjunction of its clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Inclusive bounds on a metric; a missing bound is open.
    Range {
        metric: Metric,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Case-insensitive substring match on a text field.
    Contains { field: Dimension, needle: String },
    /// Case-insensitive set membership on a field.
    OneOf { field: Dimension, values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub metric: Metric,
    #[serde(default)]
    pub direction: Direction,
}

/// Query descriptor accepted by `run_query`. Field names match the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub filter: Vec<Condition>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default, alias = "topN")]
    pub top_n: Option<usize>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn sort_by(mut self, metric: Metric, direction: Direction) -> Self {
        self.sort = Some(SortSpec { metric, direction });
        self
    }

    pub fn top(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }
}

/// Owned, serializable answer to a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<AggregateRow>,
    pub query: QueryMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMetadata {
    pub table: TableKind,
    pub rows_considered: usize,
    pub rows_returned: usize,
    pub amount_returned: f64,
    pub table_amount: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown metric: {0:?}")]
    UnknownMetric(String),

    #[error("Invalid sort direction: {0:?}")]
    InvalidDirection(String),

    #[error("Field {field} is not available on table {table}")]
    UnknownField { field: Dimension, table: TableKind },

    #[error("Invalid range: min {min} exceeds max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid bucket boundaries: {0}")]
    InvalidBoundaries(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}
