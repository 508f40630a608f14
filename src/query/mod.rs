//! Stateless operations over loaded tables.
//!
//! Every operation borrows its input and returns a new `View` or report;
//! nothing here mutates a table or touches the filesystem.

pub mod consistency;
pub mod crosstab;
pub mod entity_summary;
pub mod filter;
pub mod histogram;
pub mod metrics;
pub mod ranking;
pub mod view;

pub use consistency::{
    check_program_years, check_rollup, check_state_counties, check_year_states,
    ConsistencyReport, Violation,
};
pub use crosstab::{cross_join, CrossJoinSpec, CrossTab, CrossTabCell, CrossTabRow};
pub use entity_summary::{summarize_entity_types, EntityTypeSummary};
pub use filter::filter;
pub use histogram::{bucketize, Bucket, BucketTotals, Histogram};
pub use metrics::{average, percent_of_total, ratio, share_of_total, AmountTotal};
pub use ranking::{sort, top_n};
pub use view::View;

use crate::store::AggregateTable;
use crate::types::{QueryError, QueryMetadata, QueryResult, QuerySpec};

/// Apply a query descriptor: filter, then sort, then truncate.
pub fn run_query<'a>(table: &'a AggregateTable, spec: &QuerySpec) -> Result<View<'a>, QueryError> {
    // 1. Filtering phase
    let view = filter(table.view(), &spec.filter)?;

    // 2. Ordering phase
    let view = match &spec.sort {
        Some(sort_spec) => sort(view, &sort_spec.metric, sort_spec.direction)?,
        None => view,
    };

    // 3. Truncation phase
    Ok(match spec.top_n {
        Some(n) => top_n(view, n),
        None => view,
    })
}

impl<'a> View<'a> {
    /// Owned result with metadata describing how it was derived.
    pub fn into_result(self) -> QueryResult {
        let table = self.table();
        let metadata = QueryMetadata {
            table: table.kind(),
            rows_considered: table.len(),
            rows_returned: self.len(),
            amount_returned: self.total_amount(),
            table_amount: table.total_amount(),
        };
        QueryResult {
            rows: self.to_rows(),
            query: metadata,
        }
    }
}
