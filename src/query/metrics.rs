// Division guard:
// every ratio returns 0 for a zero (or non-finite) denominator
// nothing here produces NaN or infinity
// guard hits are logged at debug, never raised

use tracing::debug;

use crate::query::view::View;
use crate::store::AggregateTable;
use crate::types::{AggregateRow, Metric, QueryError};

/// Anything with a denominator for share-of-total calculations.
///
/// Full tables answer from the total cached at load; views sum their rows.
pub trait AmountTotal {
    fn amount_total(&self) -> f64;
}

impl AmountTotal for AggregateTable {
    fn amount_total(&self) -> f64 {
        self.total_amount()
    }
}

impl AmountTotal for View<'_> {
    fn amount_total(&self) -> f64 {
        self.total_amount()
    }
}

pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        debug!(numerator, denominator, "division guard returned 0");
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        debug!(numerator, denominator, "division guard returned 0 for overflow");
        0.0
    }
}

/// `amount / payments`; 0 for rows with no payments.
pub fn average(row: &AggregateRow) -> f64 {
    ratio(row.amount, row.payments as f64)
}

/// Fraction of `total` that `amount` makes up, in 0..1 for non-negative data.
pub fn share_of_total(amount: f64, total: f64) -> f64 {
    ratio(amount, total)
}

/// `row.amount / sum(table.amount)`, scaled to a percentage (0..100).
pub fn percent_of_total<T: AmountTotal + ?Sized>(table: &T, row: &AggregateRow) -> f64 {
    share_of_total(row.amount, table.amount_total()) * 100.0
}

impl Metric {
    /// Value of this metric for `row`. A named column the row lacks reads as 0.
    pub fn value(&self, row: &AggregateRow) -> f64 {
        match self {
            Metric::Amount => row.amount,
            Metric::Payments => row.payments as f64,
            Metric::Average => average(row),
            Metric::Column(column) => row.column(column).unwrap_or(0.0),
        }
    }

    /// Reject columns the table does not carry on any row.
    pub fn validate(&self, table: &AggregateTable) -> Result<(), QueryError> {
        match self {
            Metric::Column(column) if !table.has_column(column) => {
                Err(QueryError::UnknownMetric(column.clone()))
            }
            _ => Ok(()),
        }
    }
}
