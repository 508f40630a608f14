use crate::store::AggregateTable;
use crate::types::{AggregateRow, TableKind};

/// A derived, ordered selection of rows borrowed from one table.
///
/// Filtering, sorting and truncation produce new views; the table itself is
/// never touched, and no row is cloned until `to_rows` is called.
#[derive(Debug, Clone)]
pub struct View<'a> {
    table: &'a AggregateTable,
    rows: Vec<&'a AggregateRow>,
}

impl<'a> View<'a> {
    /// Every row of `table`, in table order.
    pub fn new(table: &'a AggregateTable) -> Self {
        Self {
            table,
            rows: table.rows().iter().collect(),
        }
    }

    pub(crate) fn with_rows(table: &'a AggregateTable, rows: Vec<&'a AggregateRow>) -> Self {
        Self { table, rows }
    }

    pub(crate) fn into_parts(self) -> (&'a AggregateTable, Vec<&'a AggregateRow>) {
        (self.table, self.rows)
    }

    pub fn table(&self) -> &'a AggregateTable {
        self.table
    }

    pub fn kind(&self) -> TableKind {
        self.table.kind()
    }

    pub fn rows(&self) -> &[&'a AggregateRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a AggregateRow> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum over the rows of this view, recomputed on each call.
    pub fn total_amount(&self) -> f64 {
        self.rows.iter().map(|row| row.amount).sum()
    }

    pub fn total_payments(&self) -> u64 {
        self.rows.iter().map(|row| row.payments).sum()
    }

    pub fn to_rows(&self) -> Vec<AggregateRow> {
        self.rows.iter().map(|row| (*row).clone()).collect()
    }
}

impl AggregateTable {
    pub fn view(&self) -> View<'_> {
        View::new(self)
    }
}
