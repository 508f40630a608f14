use serde::Serialize;

use crate::query::view::View;
use crate::types::{Metric, QueryError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BucketTotals {
    pub rows: usize,
    pub amount: f64,
    pub payments: u64,
}

impl BucketTotals {
    fn add(&mut self, amount: f64, payments: u64) {
        self.rows += 1;
        self.amount += amount;
        self.payments += payments;
    }
}

/// `[min, max)`; the last bucket has no upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub min: f64,
    pub max: Option<f64>,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub metric: Metric,
    pub buckets: Vec<Bucket>,
    /// Rows whose metric falls below the first boundary (net clawbacks, usually).
    pub below_range: BucketTotals,
}

impl Histogram {
    pub fn rows(&self) -> usize {
        self.below_range.rows + self.buckets.iter().map(|b| b.totals.rows).sum::<usize>()
    }
}

/// Partition rows by `metric` into ranges starting at each boundary.
///
/// Boundaries must be finite and strictly increasing. Bucket sums are of
/// `amount` regardless of the metric used to place the row.
pub fn bucketize(view: &View<'_>, metric: &Metric, boundaries: &[f64]) -> Result<Histogram, QueryError> {
    metric.validate(view.table())?;
    if boundaries.is_empty() {
        return Err(QueryError::InvalidBoundaries("no boundaries given".to_string()));
    }
    if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
        return Err(QueryError::InvalidBoundaries(format!("boundary {bad} is not finite")));
    }
    if let Some(pair) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
        return Err(QueryError::InvalidBoundaries(format!(
            "boundaries must increase strictly, got {} then {}",
            pair[0], pair[1]
        )));
    }

    let mut buckets: Vec<Bucket> = boundaries
        .iter()
        .enumerate()
        .map(|(i, &min)| Bucket {
            min,
            max: boundaries.get(i + 1).copied(),
            totals: BucketTotals::default(),
        })
        .collect();
    let mut below_range = BucketTotals::default();

    for row in view.iter() {
        let value = metric.value(row);
        // number of boundaries <= value; 0 means below the first bucket
        match boundaries.partition_point(|b| *b <= value) {
            0 => below_range.add(row.amount, row.payments),
            n => buckets[n - 1].totals.add(row.amount, row.payments),
        }
    }

    Ok(Histogram {
        metric: metric.clone(),
        buckets,
        below_range,
    })
}
