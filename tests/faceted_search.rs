use std::collections::HashMap;
use std::sync::Arc;

use payments_core::config::SearchConfig;
use payments_core::search::{Facet, FacetedSearch};
use payments_core::store::AggregateTable;
use payments_core::types::{
    AggregateRow, Dimension, Fips, Metric, QueryError, RowKey, StateCode, TableKind,
};

type Tables = HashMap<TableKind, Arc<AggregateTable>>;

fn state_row(code: &str, name: &str, amount: f64) -> AggregateRow {
    let key = RowKey::default().with_state(StateCode::parse(code).unwrap());
    AggregateRow::new(key, amount, 1).with_name(name)
}

fn county_row(code: &str, county: &str, fips: &str, amount: f64) -> AggregateRow {
    let key = RowKey::default()
        .with_state(StateCode::parse(code).unwrap())
        .with_county(county, Fips::parse(fips).unwrap());
    AggregateRow::new(key, amount, 1)
}

fn program_row(program: &str, code: &str, amount: f64, payments: u64) -> AggregateRow {
    AggregateRow::new(RowKey::default().with_program(program), amount, payments).with_code(code)
}

fn fixture() -> Tables {
    let mut tables = Tables::new();
    tables.insert(
        TableKind::States,
        Arc::new(AggregateTable::from_rows(
            TableKind::States,
            vec![
                state_row("IN", "Indiana", 1_000_000_000.0),
                state_row("IA", "Iowa", 3_150_000_000.0),
                state_row("NE", "Nebraska", 2_000_000_000.0),
            ],
        )),
    );
    tables.insert(
        TableKind::Counties,
        Arc::new(AggregateTable::from_rows(
            TableKind::Counties,
            vec![
                county_row("IA", "Story", "19169", 150_000_000.0),
                county_row("IA", "Polk", "19153", 200_000_000.0),
                county_row("IA", "Iowa", "19095", 10_000_000.0),
                county_row("NE", "Lancaster", "31109", 50_000_000.0),
            ],
        )),
    );
    tables.insert(
        TableKind::Programs,
        Arc::new(AggregateTable::from_rows(
            TableKind::Programs,
            vec![
                program_row("MARKET FACILITATION PROGRAM", "MFP", 10_000_000_000.0, 900_000),
                program_row("CONSERVATION RESERVE PROGRAM", "CRP", 15_700_000_000.0, 6_300_000),
                program_row("DAIRY MARGIN COVERAGE", "DMC", 1_000_000_000.0, 40_000),
            ],
        )),
    );
    tables.insert(
        TableKind::TopRecipients,
        Arc::new(AggregateTable::from_rows(
            TableKind::TopRecipients,
            vec![
                AggregateRow::new(RowKey::default().with_recipient("IOWA DEPT OF AGRICULTURE"), 5_000_000.0, 12),
                AggregateRow::new(RowKey::default().with_recipient("SMITH FAMILY LLC"), 1_000_000.0, 30),
            ],
        )),
    );
    tables.insert(
        TableKind::EntityTypes,
        Arc::new(AggregateTable::from_rows(
            TableKind::EntityTypes,
            vec![
                AggregateRow::new(RowKey::default().with_entity_type("Individual"), 2_000_000_000.0, 1),
                AggregateRow::new(RowKey::default().with_entity_type("LLC"), 1_000_000_000.0, 1),
            ],
        )),
    );
    tables
}

fn keys(hits: &[payments_core::search::SearchHit]) -> Vec<&str> {
    hits.iter().map(|hit| hit.key.as_str()).collect()
}

#[test]
fn invariant_short_queries_return_empty_categories() {
    let tables = fixture();
    let search = FacetedSearch::default();

    for query in ["", "a", " i ", "   "] {
        let results = search.search(&tables, query);
        assert!(results.is_empty(), "query {query:?} should return nothing");
        let categories: Vec<&str> = results.categories().collect();
        assert_eq!(categories, vec!["entity_types", "geography", "programs", "recipients"]);
    }
}

#[test]
fn two_character_query_searches() {
    let tables = fixture();
    let results = FacetedSearch::default().search(&tables, "io");

    assert_eq!(keys(results.get("geography")), vec!["ia", "19095"]);
    assert_eq!(
        keys(results.get("programs")),
        vec!["conservation-reserve-program", "market-facilitation-program"]
    );
    assert_eq!(keys(results.get("recipients")), vec!["iowa-dept-of-agriculture"]);
    assert!(results.get("entity_types").is_empty());
}

#[test]
fn matching_is_case_insensitive_and_ranked_by_amount() {
    let tables = fixture();
    let results = FacetedSearch::default().search(&tables, "IOWA");

    let geography = results.get("geography");
    assert_eq!(geography[0].label, "Iowa");
    assert_eq!(geography[0].table, TableKind::States);
    assert_eq!(geography[1].label, "Iowa, IA");
    assert_eq!(geography[1].table, TableKind::Counties);
    assert!(geography.windows(2).all(|w| w[0].amount >= w[1].amount));
}

#[test]
fn every_query_token_must_match() {
    let tables = fixture();
    let results = FacetedSearch::default().search(&tables, "story ia");

    let geography = results.get("geography");
    assert_eq!(geography.len(), 1);
    assert_eq!(geography[0].key, "19169");
    assert_eq!(geography[0].label, "Story, IA");
}

#[test]
fn program_codes_and_entity_types_are_searchable() {
    let tables = fixture();
    let search = FacetedSearch::default();

    assert_eq!(keys(search.search(&tables, "dmc").get("programs")), vec!["dairy-margin-coverage"]);
    assert_eq!(keys(search.search(&tables, "llc").get("entity_types")), vec!["llc"]);
    assert_eq!(keys(search.search(&tables, "llc").get("recipients")), vec!["smith-family-llc"]);
}

#[test]
fn invariant_caps_are_per_category() {
    let mut tables = fixture();
    let flood: Vec<AggregateRow> = (1..=50)
        .map(|i| county_row("IA", &format!("Farm Hollow {i}"), &format!("19{i:03}"), i as f64))
        .collect();
    tables.insert(
        TableKind::Counties,
        Arc::new(AggregateTable::from_rows(TableKind::Counties, flood)),
    );
    tables.insert(
        TableKind::Programs,
        Arc::new(AggregateTable::from_rows(
            TableKind::Programs,
            vec![program_row("FARM STORAGE FACILITY LOAN", "FSFL", 3.0, 1)],
        )),
    );

    let results = FacetedSearch::default().search(&tables, "farm");
    let geography = results.get("geography");
    assert_eq!(geography.len(), 10);
    assert_eq!(geography[0].amount, 50.0);
    assert_eq!(geography[9].amount, 41.0);
    assert_eq!(results.get("programs").len(), 1);

    let tight = FacetedSearch::new(SearchConfig {
        min_query_len: 2,
        per_category_cap: 3,
    });
    assert_eq!(tight.search(&tables, "farm").get("geography").len(), 3);
}

#[test]
fn ties_prefer_earlier_source_then_table_order() {
    let mut tables = Tables::new();
    tables.insert(
        TableKind::States,
        Arc::new(AggregateTable::from_rows(
            TableKind::States,
            vec![state_row("IA", "Iowa", 100.0)],
        )),
    );
    tables.insert(
        TableKind::Counties,
        Arc::new(AggregateTable::from_rows(
            TableKind::Counties,
            vec![
                county_row("IA", "Iowa", "19095", 100.0),
                county_row("WI", "Iowa", "55049", 100.0),
            ],
        )),
    );

    let results = FacetedSearch::default().search(&tables, "iowa");
    assert_eq!(keys(results.get("geography")), vec!["ia", "19095", "55049"]);
}

#[test]
fn missing_table_degrades_to_partial_results() {
    let mut tables = fixture();
    tables.remove(&TableKind::Counties);
    tables.remove(&TableKind::TopRecipients);

    let results = FacetedSearch::default().search(&tables, "iowa");
    assert_eq!(keys(results.get("geography")), vec!["ia"]);
    assert!(results.get("recipients").is_empty());
}

#[test]
fn invariant_search_is_idempotent() {
    let tables = fixture();
    let search = FacetedSearch::default();
    assert_eq!(search.search(&tables, "ia"), search.search(&tables, "ia"));
}

#[test]
fn registered_facets_rank_by_their_own_metric() {
    let tables = fixture();
    let mut search = FacetedSearch::with_facets(SearchConfig::v0(), vec![]).unwrap();
    search
        .register(
            Facet::new("busiest_programs")
                .source(TableKind::Programs)
                .field(Dimension::Program)
                .rank_by(Metric::Payments)
                .cap(2),
        )
        .unwrap();

    let results = search.search(&tables, "program");
    let categories: Vec<&str> = results.categories().collect();
    assert_eq!(categories, vec!["busiest_programs"]);
    assert_eq!(
        keys(results.get("busiest_programs")),
        vec!["conservation-reserve-program", "market-facilitation-program"]
    );
}

#[test]
fn registration_rejects_duplicates_and_empty_facets() {
    let mut search = FacetedSearch::default();

    let duplicate = Facet::new("programs").source(TableKind::Programs).field(Dimension::Name);
    assert!(matches!(
        search.register(duplicate),
        Err(QueryError::InvalidParameter { .. })
    ));

    let empty = Facet::new("nothing");
    assert!(matches!(search.register(empty), Err(QueryError::InvalidParameter { .. })));
    assert_eq!(search.facets().len(), 4);
}

#[test]
fn golden_search_results_shape() {
    let tables = fixture();
    let results = FacetedSearch::default().search(&tables, "nebraska");

    let value = serde_json::to_value(&results).unwrap();
    let hit = &value["geography"][0];
    assert_eq!(hit["key"], "ne");
    assert_eq!(hit["label"], "Nebraska");
    assert_eq!(hit["amount"], 2_000_000_000.0);
    assert_eq!(hit["table"], "states");
    assert_eq!(value["programs"], serde_json::json!([]));
}
