use std::collections::HashSet;

use crate::query::view::View;
use crate::store::AggregateTable;
use crate::types::{AggregateRow, Condition, Dimension, Metric, QueryError};

/// Keep the rows satisfying every condition, preserving their order.
///
/// All conditions are validated against the table before any row is
/// examined, so a bad parameter fails the whole call.
pub fn filter<'a>(view: View<'a>, conditions: &[Condition]) -> Result<View<'a>, QueryError> {
    let compiled = conditions
        .iter()
        .map(|c| Compiled::new(c, view.table()))
        .collect::<Result<Vec<_>, _>>()?;

    if compiled.is_empty() {
        return Ok(view);
    }

    let (table, mut rows) = view.into_parts();
    rows.retain(|row| compiled.iter().all(|c| c.matches(row)));
    Ok(View::with_rows(table, rows))
}

enum Compiled<'c> {
    Range { metric: &'c Metric, min: f64, max: f64 },
    Contains { field: Dimension, needle: String },
    OneOf { field: Dimension, values: HashSet<String> },
}

impl<'c> Compiled<'c> {
    fn new(condition: &'c Condition, table: &AggregateTable) -> Result<Self, QueryError> {
        match condition {
            Condition::Range { metric, min, max } => {
                metric.validate(table)?;
                let min = min.unwrap_or(f64::NEG_INFINITY);
                let max = max.unwrap_or(f64::INFINITY);
                if min.is_nan() || max.is_nan() || min > max {
                    return Err(QueryError::InvalidRange { min, max });
                }
                Ok(Compiled::Range { metric, min, max })
            }
            Condition::Contains { field, needle } => {
                check_field(*field, table)?;
                Ok(Compiled::Contains {
                    field: *field,
                    needle: needle.trim().to_lowercase(),
                })
            }
            Condition::OneOf { field, values } => {
                check_field(*field, table)?;
                Ok(Compiled::OneOf {
                    field: *field,
                    values: values.iter().map(|v| v.trim().to_lowercase()).collect(),
                })
            }
        }
    }

    fn matches(&self, row: &AggregateRow) -> bool {
        match self {
            Compiled::Range { metric, min, max } => {
                let v = metric.value(row);
                *min <= v && v <= *max
            }
            Compiled::Contains { field, needle } => {
                field_text(row, *field).is_some_and(|text| text.contains(needle.as_str()))
            }
            Compiled::OneOf { field, values } => {
                field_text(row, *field).is_some_and(|text| values.contains(&text))
            }
        }
    }
}

fn check_field(field: Dimension, table: &AggregateTable) -> Result<(), QueryError> {
    if table.kind().has_field(field) {
        Ok(())
    } else {
        Err(QueryError::UnknownField {
            field,
            table: table.kind(),
        })
    }
}

/// Lowercased text of a field. `name` falls back to the derived label so
/// rows without an explicit name are still addressable by what they display.
pub(crate) fn field_text(row: &AggregateRow, field: Dimension) -> Option<String> {
    match field {
        Dimension::Name => Some(row.label().to_lowercase()),
        other => row.attribute(other).map(|v| v.to_string().to_lowercase()),
    }
}
