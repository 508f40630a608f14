use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::debug;

use crate::query::view::View;
use crate::types::{DimValue, Dimension, QueryError, TableKind};

/// Which dimensions to join on and which inner values must appear.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossJoinSpec {
    pub outer: Dimension,
    pub inner: Dimension,
    /// Inner values every outer row gets a cell for. `None` uses every inner
    /// value present in the fine table; years are filled in from the first
    /// observed year to the last so a gap year still gets a column.
    pub domain: Option<Vec<DimValue>>,
}

impl CrossJoinSpec {
    pub fn new(outer: Dimension, inner: Dimension) -> Self {
        Self {
            outer,
            inner,
            domain: None,
        }
    }

    /// `outer` by year, with a cell for every year in `years`.
    pub fn by_years(outer: Dimension, years: RangeInclusive<i32>) -> Self {
        Self {
            outer,
            inner: Dimension::Year,
            domain: Some(years.map(DimValue::from).collect()),
        }
    }

    pub fn with_domain(mut self, domain: Vec<DimValue>) -> Self {
        self.domain = Some(domain);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub key: DimValue,
    pub amount: f64,
    pub payments: u64,
    /// False when the fine table had no row for this combination and the
    /// cell was zero-filled.
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabRow {
    pub key: DimValue,
    pub label: String,
    pub amount: f64,
    pub payments: u64,
    pub cells: Vec<CrossTabCell>,
}

impl CrossTabRow {
    pub fn cell(&self, key: &DimValue) -> Option<&CrossTabCell> {
        self.cells.iter().find(|cell| &cell.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub outer: Dimension,
    pub inner: Dimension,
    pub columns: Vec<DimValue>,
    pub rows: Vec<CrossTabRow>,
    /// Fine rows dropped because their outer key is not in the coarse view
    /// or their inner key is outside the domain.
    pub unmatched: usize,
}

impl CrossTab {
    pub fn row(&self, key: &DimValue) -> Option<&CrossTabRow> {
        self.rows.iter().find(|row| &row.key == key)
    }
}

/// Join a table keyed by `outer` with a table keyed by `outer × inner`.
///
/// Every coarse row appears once, in view order, with one cell per domain
/// value. Combinations with no fine row are zero-filled rather than dropped,
/// so a year with no activity still shows up.
pub fn cross_join(coarse: &View<'_>, fine: &View<'_>, spec: &CrossJoinSpec) -> Result<CrossTab, QueryError> {
    require_key(coarse.kind(), spec.outer)?;
    require_key(fine.kind(), spec.outer)?;
    require_key(fine.kind(), spec.inner)?;
    if spec.outer == spec.inner {
        return Err(QueryError::InvalidParameter {
            name: "inner".to_string(),
            reason: "must differ from the outer dimension".to_string(),
        });
    }

    let columns: Vec<DimValue> = match &spec.domain {
        Some(domain) => domain.clone(),
        None => observed_domain(fine, spec.inner),
    };
    let column_set: BTreeSet<&DimValue> = columns.iter().collect();

    let outer_keys: BTreeSet<DimValue> = coarse
        .iter()
        .filter_map(|row| row.key.get(spec.outer))
        .collect();

    // Fine tables whose shape is wider than outer × inner are summed per cell.
    let mut cells: HashMap<(DimValue, DimValue), (f64, u64)> = HashMap::new();
    let mut unmatched = 0;
    for row in fine.iter() {
        let (Some(outer), Some(inner)) = (row.key.get(spec.outer), row.key.get(spec.inner)) else {
            unmatched += 1;
            continue;
        };
        if !outer_keys.contains(&outer) || !column_set.contains(&inner) {
            unmatched += 1;
            continue;
        }
        let cell = cells.entry((outer, inner)).or_insert((0.0, 0));
        cell.0 += row.amount;
        cell.1 += row.payments;
    }
    if unmatched > 0 {
        debug!(
            coarse = %coarse.kind(),
            fine = %fine.kind(),
            unmatched,
            "cross join dropped fine rows without a coarse match"
        );
    }

    let rows = coarse
        .iter()
        .filter_map(|row| {
            let key = row.key.get(spec.outer)?;
            let row_cells = columns
                .iter()
                .map(|column| match cells.get(&(key.clone(), column.clone())) {
                    Some(&(amount, payments)) => CrossTabCell {
                        key: column.clone(),
                        amount,
                        payments,
                        present: true,
                    },
                    None => CrossTabCell {
                        key: column.clone(),
                        amount: 0.0,
                        payments: 0,
                        present: false,
                    },
                })
                .collect();
            Some(CrossTabRow {
                key,
                label: row.label(),
                amount: row.amount,
                payments: row.payments,
                cells: row_cells,
            })
        })
        .collect();

    Ok(CrossTab {
        outer: spec.outer,
        inner: spec.inner,
        columns,
        rows,
        unmatched,
    })
}

fn observed_domain(fine: &View<'_>, inner: Dimension) -> Vec<DimValue> {
    let observed: BTreeSet<DimValue> = fine.iter().filter_map(|row| row.key.get(inner)).collect();
    if inner != Dimension::Year {
        return observed.into_iter().collect();
    }
    let years: Vec<i64> = observed.iter().filter_map(DimValue::as_int).collect();
    match (years.first(), years.last()) {
        (Some(&first), Some(&last)) => (first..=last).map(DimValue::Int).collect(),
        _ => Vec::new(),
    }
}

fn require_key(table: TableKind, dimension: Dimension) -> Result<(), QueryError> {
    if table.key_shape().contains(&dimension) {
        Ok(())
    } else {
        Err(QueryError::UnknownField {
            field: dimension,
            table,
        })
    }
}
