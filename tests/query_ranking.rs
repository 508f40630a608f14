use payments_core::format::format_percent;
use payments_core::query::{
    average, filter, percent_of_total, ratio, run_query, share_of_total, sort, top_n, View,
};
use payments_core::store::AggregateTable;
use payments_core::types::{
    AggregateRow, Condition, Dimension, Direction, Metric, QueryError, QuerySpec, RowKey,
    StateCode, TableKind,
};

fn program_row(program: &str, amount: f64, payments: u64) -> AggregateRow {
    AggregateRow::new(RowKey::default().with_program(program), amount, payments)
}

fn state_row(state: &str, amount: f64, payments: u64) -> AggregateRow {
    let key = RowKey::default().with_state(StateCode::parse(state).unwrap());
    AggregateRow::new(key, amount, payments)
}

fn labels(view: &View<'_>) -> Vec<String> {
    view.iter().map(|row| row.label()).collect()
}

fn scenario_programs() -> AggregateTable {
    AggregateTable::from_rows(
        TableKind::Programs,
        vec![
            program_row("ZOMBIE", 500.0, 3),
            program_row("CRP", 15_700_000_000.0, 6_300_000),
        ],
    )
}

fn tied_states() -> AggregateTable {
    AggregateTable::from_rows(
        TableKind::States,
        vec![
            state_row("AL", 5.0, 1),
            state_row("IA", 10.0, 2),
            state_row("KS", 5.0, 0),
            state_row("NE", 10.0, 5),
            state_row("MO", 7.0, 7),
        ],
    )
}

#[test]
fn end_to_end_scenario_one() {
    let table = scenario_programs();

    let sorted = sort(table.view(), &Metric::Amount, Direction::Desc).unwrap();
    assert_eq!(labels(&sorted), vec!["CRP", "Zombie"]);

    let zombie = sorted.rows()[1];
    let percent = percent_of_total(&table, zombie);
    let expected = 500.0 / 15_700_000_500.0 * 100.0;
    assert!((percent - expected).abs() < 1e-15);
    assert_eq!(format_percent(percent, 7), "0.0000032%");
}

#[test]
fn invariant_sort_is_stable_and_idempotent() {
    let table = tied_states();

    let once = sort(table.view(), &Metric::Amount, Direction::Desc).unwrap();
    assert_eq!(labels(&once), vec!["IA", "NE", "MO", "AL", "KS"]);

    let twice = sort(once.clone(), &Metric::Amount, Direction::Desc).unwrap();
    assert_eq!(labels(&twice), labels(&once));

    let ascending = sort(table.view(), &Metric::Amount, Direction::Asc).unwrap();
    assert_eq!(labels(&ascending), vec!["AL", "KS", "MO", "IA", "NE"]);
}

#[test]
fn sort_by_payments_and_average() {
    let table = tied_states();

    let by_payments = sort(table.view(), &Metric::Payments, Direction::Desc).unwrap();
    assert_eq!(labels(&by_payments), vec!["MO", "NE", "IA", "AL", "KS"]);

    // averages: AL 5, IA 5, KS 0 (no payments), NE 2, MO 1
    let by_average = sort(table.view(), &Metric::Average, Direction::Desc).unwrap();
    assert_eq!(labels(&by_average), vec!["AL", "IA", "NE", "MO", "KS"]);
}

#[test]
fn sort_by_precomputed_column() {
    let table = AggregateTable::from_rows(
        TableKind::States,
        vec![
            state_row("IA", 10.0, 1).with_column("per_capita", 3.0),
            state_row("NE", 20.0, 1).with_column("per_capita", 9.0),
            state_row("KS", 30.0, 1),
        ],
    );

    let sorted = sort(table.view(), &Metric::Column("per_capita".into()), Direction::Desc).unwrap();
    assert_eq!(labels(&sorted), vec!["NE", "IA", "KS"]);
}

#[test]
fn sort_by_unknown_metric_is_rejected() {
    let table = tied_states();
    let err = sort(table.view(), &Metric::Column("per_capita".into()), Direction::Desc).unwrap_err();
    assert_eq!(err, QueryError::UnknownMetric("per_capita".into()));

    assert!(matches!("".parse::<Metric>(), Err(QueryError::UnknownMetric(_))));
    assert!(matches!("sideways".parse::<Direction>(), Err(QueryError::InvalidDirection(_))));
    assert_eq!("paymentCount".parse::<Metric>().unwrap(), Metric::Payments);
}

#[test]
fn invariant_top_n_boundaries() {
    let table = tied_states();

    assert!(top_n(table.view(), 0).is_empty());
    assert_eq!(labels(&top_n(table.view(), table.len())), labels(&table.view()));
    assert_eq!(labels(&top_n(table.view(), 1_000)), labels(&table.view()));
    assert_eq!(labels(&top_n(table.view(), 2)), vec!["AL", "IA"]);
}

#[test]
fn invariant_division_guard() {
    let table = tied_states();
    for row in table.iter() {
        let value = average(row);
        assert!(value.is_finite());
        if row.payments == 0 {
            assert_eq!(value, 0.0);
        }
    }

    assert_eq!(ratio(1.0, 0.0), 0.0);
    assert_eq!(ratio(0.0, 0.0), 0.0);
    assert_eq!(ratio(1.0, f64::NAN), 0.0);
    assert_eq!(ratio(f64::MAX, f64::MIN_POSITIVE), 0.0);
    assert_eq!(share_of_total(5.0, 0.0), 0.0);

    let net_zero = AggregateTable::from_rows(
        TableKind::Programs,
        vec![program_row("A", 5.0, 1), program_row("B", -5.0, 1)],
    );
    assert_eq!(net_zero.total_amount(), 0.0);
    assert_eq!(percent_of_total(&net_zero, &net_zero.rows()[0]), 0.0);
}

#[test]
fn percent_of_view_uses_view_total() {
    let table = tied_states();
    let top = top_n(sort(table.view(), &Metric::Amount, Direction::Desc).unwrap(), 2);

    assert_eq!(top.total_amount(), 20.0);
    assert_eq!(percent_of_total(&top, top.rows()[0]), 50.0);
    assert_eq!(percent_of_total(&table, top.rows()[0]), 10.0 / 37.0 * 100.0);
}

#[test]
fn filter_range_is_inclusive_and_order_preserving() {
    let table = tied_states();
    let condition = Condition::Range {
        metric: Metric::Amount,
        min: Some(7.0),
        max: None,
    };

    let view = filter(table.view(), &[condition]).unwrap();
    assert_eq!(labels(&view), vec!["IA", "NE", "MO"]);

    let bounded = Condition::Range {
        metric: Metric::Amount,
        min: Some(5.0),
        max: Some(7.0),
    };
    let view = filter(table.view(), &[bounded]).unwrap();
    assert_eq!(labels(&view), vec!["AL", "KS", "MO"]);
}

#[test]
fn filter_conditions_are_conjunctive() {
    let table = tied_states();
    let conditions = [
        Condition::OneOf {
            field: Dimension::State,
            values: vec!["ia".into(), "NE".into(), "al".into()],
        },
        Condition::Range {
            metric: Metric::Amount,
            min: Some(6.0),
            max: None,
        },
    ];
    let view = filter(table.view(), &conditions).unwrap();
    assert_eq!(labels(&view), vec!["IA", "NE"]);
}

#[test]
fn filter_contains_matches_labels_case_insensitively() {
    let table = scenario_programs();
    let view = filter(
        table.view(),
        &[Condition::Contains {
            field: Dimension::Name,
            needle: "zomb".into(),
        }],
    )
    .unwrap();
    assert_eq!(labels(&view), vec!["Zombie"]);
}

#[test]
fn filter_rejects_bad_parameters() {
    let table = tied_states();

    let inverted = Condition::Range {
        metric: Metric::Amount,
        min: Some(10.0),
        max: Some(1.0),
    };
    assert!(matches!(
        filter(table.view(), &[inverted]),
        Err(QueryError::InvalidRange { .. })
    ));

    let wrong_field = Condition::Contains {
        field: Dimension::Recipient,
        needle: "smith".into(),
    };
    assert_eq!(
        filter(table.view(), &[wrong_field]).unwrap_err(),
        QueryError::UnknownField {
            field: Dimension::Recipient,
            table: TableKind::States,
        }
    );
}

#[test]
fn run_query_from_json_descriptor() {
    let table = tied_states();
    let spec: QuerySpec = serde_json::from_str(
        r#"{
            "filter": [{"op": "range", "metric": "amount", "min": 6}],
            "sort": {"metric": "paymentCount", "direction": "asc"},
            "topN": 2
        }"#,
    )
    .unwrap();

    let view = run_query(&table, &spec).unwrap();
    assert_eq!(labels(&view), vec!["IA", "NE"]);

    let result = view.into_result();
    assert_eq!(result.query.rows_considered, 5);
    assert_eq!(result.query.rows_returned, 2);
    assert_eq!(result.query.amount_returned, 20.0);
    assert_eq!(result.query.table_amount, 37.0);
}

#[test]
fn empty_query_returns_table_in_order() {
    let table = tied_states();
    let view = run_query(&table, &QuerySpec::new()).unwrap();
    assert_eq!(labels(&view), labels(&table.view()));
}

#[test]
fn query_spec_builder_matches_json_form() {
    let built = QuerySpec::new()
        .filter(Condition::Contains {
            field: Dimension::Name,
            needle: "ia".into(),
        })
        .sort_by(Metric::Amount, Direction::Desc)
        .top(5);

    let parsed: QuerySpec = serde_json::from_str(
        r#"{
            "filter": [{"op": "contains", "field": "name", "needle": "ia"}],
            "sort": {"metric": "totalAmount"},
            "top_n": 5
        }"#,
    )
    .unwrap();
    assert_eq!(built, parsed);
}
