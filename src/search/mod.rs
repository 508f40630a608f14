//! Substring search across several tables, grouped into categories.
//!
//! Each category ranks and caps its own matches, so a flood of hits in one
//! category never displaces another. Search holds no state between calls;
//! debouncing and discarding stale queries belong to the caller.

pub mod facets;

pub use facets::{default_facets, Facet};

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::config::SearchConfig;
use crate::query::filter::field_text;
use crate::store::TableSource;
use crate::types::{AggregateRow, QueryError, TableKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Detail or page key: FIPS, slug or lowercase state code.
    pub key: String,
    pub label: String,
    pub amount: f64,
    pub table: TableKind,
}

/// Hits per category. Every registered category is present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SearchResults(BTreeMap<String, Vec<SearchHit>>);

impl SearchResults {
    pub fn get(&self, category: &str) -> &[SearchHit] {
        self.0.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when no category has a hit.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn total_hits(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<SearchHit>> {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct FacetedSearch {
    facets: Vec<Facet>,
    config: SearchConfig,
}

impl Default for FacetedSearch {
    fn default() -> Self {
        Self::new(SearchConfig::v0())
    }
}

impl FacetedSearch {
    /// Search over the default categories.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            facets: default_facets(),
            config,
        }
    }

    /// Search over exactly `facets`.
    pub fn with_facets(config: SearchConfig, facets: Vec<Facet>) -> Result<Self, QueryError> {
        let mut search = Self {
            facets: Vec::new(),
            config,
        };
        for facet in facets {
            search.register(facet)?;
        }
        Ok(search)
    }

    /// Add a category. Names must be unique and a facet must scan something.
    pub fn register(&mut self, facet: Facet) -> Result<(), QueryError> {
        if self.facets.iter().any(|f| f.category == facet.category) {
            return Err(QueryError::InvalidParameter {
                name: "category".to_string(),
                reason: format!("{:?} is already registered", facet.category),
            });
        }
        if facet.sources.is_empty() || facet.fields.is_empty() {
            return Err(QueryError::InvalidParameter {
                name: "facet".to_string(),
                reason: format!("{:?} needs at least one source and one field", facet.category),
            });
        }
        self.facets.push(facet);
        Ok(())
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Case-insensitive search. A row matches when every whitespace token of
    /// the query is a substring of one of the facet's fields.
    ///
    /// Queries shorter than the configured minimum scan nothing and return
    /// every category empty. A table that fails to load empties only its own
    /// contribution.
    pub fn search<S: TableSource + ?Sized>(&self, source: &S, query: &str) -> SearchResults {
        let query = query.trim().to_lowercase();
        let mut results: BTreeMap<String, Vec<SearchHit>> = self
            .facets
            .iter()
            .map(|facet| (facet.category.clone(), Vec::new()))
            .collect();

        if query.chars().count() < self.config.min_query_len {
            return SearchResults(results);
        }
        let tokens: Vec<&str> = query.split_whitespace().collect();

        for facet in &self.facets {
            let hits = self.search_facet(source, facet, &tokens);
            results.insert(facet.category.clone(), hits);
        }
        SearchResults(results)
    }

    fn search_facet<S: TableSource + ?Sized>(&self, source: &S, facet: &Facet, tokens: &[&str]) -> Vec<SearchHit> {
        let tables: Vec<_> = facet
            .sources
            .iter()
            .filter_map(|&kind| match source.table(kind) {
                Ok(table) => Some((kind, table)),
                Err(err) => {
                    warn!(
                        category = %facet.category,
                        table = %kind,
                        error = %err,
                        "search category skipped a table that failed to load"
                    );
                    None
                }
            })
            .collect();

        // (rank value, source index, table, row)
        let mut matches: Vec<(f64, usize, TableKind, &AggregateRow)> = Vec::new();
        for (source_index, (kind, table)) in tables.iter().enumerate() {
            for row in table.iter() {
                if row_matches(row, facet, tokens) {
                    matches.push((facet.rank_by.value(row), source_index, *kind, row));
                }
            }
        }

        matches.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(a.1.cmp(&b.1))
                .then_with(|| a.3.ordinal().cmp(&b.3.ordinal()))
        });
        debug_assert!(matches
            .windows(2)
            .all(|w| w[0].0.total_cmp(&w[1].0) != Ordering::Less));

        let cap = facet.cap.unwrap_or(self.config.per_category_cap);
        matches
            .into_iter()
            .take(cap)
            .map(|(_, _, table, row)| SearchHit {
                key: row.lookup_key(),
                label: row.label(),
                amount: row.amount,
                table,
            })
            .collect()
    }
}

fn row_matches(row: &AggregateRow, facet: &Facet, tokens: &[&str]) -> bool {
    let texts: Vec<String> = facet
        .fields
        .iter()
        .filter_map(|&field| field_text(row, field))
        .collect();
    tokens
        .iter()
        .all(|token| texts.iter().any(|text| text.contains(token)))
}
