use std::cmp::Ordering;

use crate::query::view::View;
use crate::types::{AggregateRow, Direction, Metric, QueryError};

/// Order `view` by `metric`. Ties keep original table order, so sorting an
/// already-sorted view by the same key is a no-op.
pub fn sort<'a>(view: View<'a>, metric: &Metric, direction: Direction) -> Result<View<'a>, QueryError> {
    metric.validate(view.table())?;

    let (table, mut rows) = view.into_parts();
    rows.sort_by(|a, b| compare(metric, direction, a, b));

    debug_assert!(rows
        .windows(2)
        .all(|w| compare(metric, direction, w[0], w[1]) != Ordering::Greater));

    Ok(View::with_rows(table, rows))
}

fn compare(metric: &Metric, direction: Direction, a: &AggregateRow, b: &AggregateRow) -> Ordering {
    let by_metric = metric.value(a).total_cmp(&metric.value(b));
    let by_metric = match direction {
        Direction::Asc => by_metric,
        Direction::Desc => by_metric.reverse(),
    };
    by_metric.then_with(|| a.ordinal().cmp(&b.ordinal()))
}

/// First `n` rows. `n` beyond the view's length returns the view unchanged.
pub fn top_n(view: View<'_>, n: usize) -> View<'_> {
    let (table, mut rows) = view.into_parts();
    rows.truncate(n);
    View::with_rows(table, rows)
}
