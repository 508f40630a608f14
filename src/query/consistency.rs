use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Tolerance;
use crate::store::AggregateTable;
use crate::types::{DimValue, Dimension, QueryError, RowKey, TableKind};

/// A group whose finer rows do not add up to its aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub group: DimValue,
    /// Amount on the coarse row; 0 if the coarse table has no such group.
    pub expected: f64,
    /// Sum over the fine rows of the group.
    pub actual: f64,
    pub difference: f64,
    /// Keys of the fine rows that make up `actual`, in table order.
    pub members: Vec<RowKey>,
    /// Members whose own reference record disagrees with their row. Empty
    /// until `ConsistencyReport::attribute` runs, and when nothing finer
    /// than the fine table exists.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatched: Vec<RowKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub coarse: TableKind,
    pub fine: TableKind,
    pub group: Dimension,
    pub groups_checked: usize,
    pub violations: Vec<Violation>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation(&self, group: &DimValue) -> Option<&Violation> {
        self.violations.iter().find(|v| &v.group == group)
    }

    /// Narrow each violation down to the members that are themselves wrong.
    ///
    /// `reference` returns an independent amount for a member row (a county's
    /// detail record, say), or `None` when there is nothing to compare with.
    /// Members whose row amount falls outside `tolerance` of their reference
    /// are recorded in `Violation::mismatched`.
    pub fn attribute<F, E>(&mut self, fine: &AggregateTable, tolerance: &Tolerance, mut reference: F) -> Result<(), E>
    where
        F: FnMut(&RowKey) -> Result<Option<f64>, E>,
    {
        for violation in &mut self.violations {
            violation.mismatched.clear();
            for key in &violation.members {
                let Some(row) = fine.get(key) else {
                    continue;
                };
                if let Some(expected) = reference(key)? {
                    if !tolerance.allows(expected, row.amount) {
                        violation.mismatched.push(key.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Check that, for every value of `group`, the fine rows sum to the coarse row.
///
/// Groups present on only one side are reported too: a coarse group with no
/// fine rows sums to 0, and a fine group with no coarse row expects 0.
pub fn check_rollup(
    coarse: &AggregateTable,
    fine: &AggregateTable,
    group: Dimension,
    tolerance: &Tolerance,
) -> Result<ConsistencyReport, QueryError> {
    for table in [coarse, fine] {
        if !table.kind().key_shape().contains(&group) {
            return Err(QueryError::UnknownField {
                field: group,
                table: table.kind(),
            });
        }
    }

    let mut sums: BTreeMap<DimValue, (f64, Vec<&RowKey>)> = BTreeMap::new();
    for row in fine.iter() {
        if let Some(value) = row.key.get(group) {
            let entry = sums.entry(value).or_insert_with(|| (0.0, Vec::new()));
            entry.0 += row.amount;
            entry.1.push(&row.key);
        }
    }

    let mut violations = Vec::new();
    let mut groups_checked = 0;

    for row in coarse.iter() {
        let Some(value) = row.key.get(group) else {
            continue;
        };
        groups_checked += 1;
        let (actual, members) = sums.remove(&value).unwrap_or_default();
        if !tolerance.allows(row.amount, actual) {
            violations.push(Violation {
                group: value,
                expected: row.amount,
                actual,
                difference: actual - row.amount,
                members: members.into_iter().cloned().collect(),
                mismatched: Vec::new(),
            });
        }
    }

    // Whatever is left has no coarse row.
    for (value, (actual, members)) in sums {
        groups_checked += 1;
        if !tolerance.allows(0.0, actual) {
            violations.push(Violation {
                group: value,
                expected: 0.0,
                actual,
                difference: actual,
                members: members.into_iter().cloned().collect(),
                mismatched: Vec::new(),
            });
        }
    }

    Ok(ConsistencyReport {
        coarse: coarse.kind(),
        fine: fine.kind(),
        group,
        groups_checked,
        violations,
    })
}

/// State totals against the sum of their counties.
pub fn check_state_counties(
    states: &AggregateTable,
    counties: &AggregateTable,
    tolerance: &Tolerance,
) -> Result<ConsistencyReport, QueryError> {
    check_rollup(states, counties, Dimension::State, tolerance)
}

/// All-time program totals against the sum of their years.
pub fn check_program_years(
    programs: &AggregateTable,
    program_yearly: &AggregateTable,
    tolerance: &Tolerance,
) -> Result<ConsistencyReport, QueryError> {
    check_rollup(programs, program_yearly, Dimension::Program, tolerance)
}

/// National yearly totals against the sum of states for that year.
pub fn check_year_states(
    yearly: &AggregateTable,
    state_yearly: &AggregateTable,
    tolerance: &Tolerance,
) -> Result<ConsistencyReport, QueryError> {
    check_rollup(yearly, state_yearly, Dimension::Year, tolerance)
}
