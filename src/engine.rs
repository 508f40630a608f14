use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::classify::EntityType;
use crate::config::StoreConfig;
use crate::query::{check_program_years, check_state_counties, check_year_states, run_query, ConsistencyReport};
use crate::search::{FacetedSearch, SearchResults};
use crate::store::{AggregateStore, AggregateTable, Detail, DetailError, DetailKind, Lookup, SnapshotError, TableError};
use crate::types::{QueryError, QueryResult, QuerySpec, RowKey, TableKind};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Detail(#[from] DetailError),
}

/// The operations a presentation layer calls, one method per operation,
/// with owned serializable outputs.
#[derive(Debug)]
pub struct PaymentsEngine {
    store: AggregateStore,
    search: FacetedSearch,
}

impl PaymentsEngine {
    pub fn open(root: impl Into<PathBuf>, config: StoreConfig) -> Result<Self, SnapshotError> {
        Ok(Self::new(AggregateStore::open(root, config)?))
    }

    /// Engine over `store` with the default search categories.
    pub fn new(store: AggregateStore) -> Self {
        let search = FacetedSearch::new(store.config().search);
        Self { store, search }
    }

    pub fn with_search(store: AggregateStore, search: FacetedSearch) -> Self {
        Self { store, search }
    }

    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<AggregateTable>, TableError> {
        self.store.table_by_name(name)
    }

    pub fn get_detail(&self, kind: &str, key: &str) -> Result<Lookup<Detail>, DetailError> {
        let kind: DetailKind = kind.parse()?;
        self.store.detail(kind, key)
    }

    pub fn query(&self, table: &str, spec: &QuerySpec) -> Result<QueryResult, EngineError> {
        let table = self.get_table(table)?;
        let view = run_query(&table, spec)?;
        Ok(view.into_result())
    }

    pub fn search(&self, query: &str) -> SearchResults {
        self.search.search(&self.store, query)
    }

    pub fn classify_entity(&self, name: &str) -> EntityType {
        crate::classify::classify_entity(name)
    }

    /// Run every cross-table rollup check the catalog supports, using the
    /// store's configured tolerance.
    ///
    /// State/county violations are narrowed to the counties whose detail
    /// record disagrees with their row, when detail records exist.
    pub fn check_consistency(&self) -> Result<Vec<ConsistencyReport>, EngineError> {
        let tolerance = &self.store.config().tolerance;

        let states = self.store.table(TableKind::States)?;
        let counties = self.store.table(TableKind::Counties)?;
        let programs = self.store.table(TableKind::Programs)?;
        let program_yearly = self.store.table(TableKind::ProgramYearly)?;
        let yearly = self.store.table(TableKind::Yearly)?;
        let state_yearly = self.store.table(TableKind::StateYearly)?;

        let mut state_counties = check_state_counties(&states, &counties, tolerance)?;
        state_counties.attribute(&counties, tolerance, |key| self.county_reference(key))?;

        Ok(vec![
            state_counties,
            check_program_years(&programs, &program_yearly, tolerance)?,
            check_year_states(&yearly, &state_yearly, tolerance)?,
        ])
    }

    fn county_reference(&self, key: &RowKey) -> Result<Option<f64>, EngineError> {
        let Some(fips) = &key.fips else {
            return Ok(None);
        };
        match self.store.detail(DetailKind::County, &fips.to_string())? {
            Lookup::Found(detail) => Ok(Some(detail.amount())),
            Lookup::NotFound => Ok(None),
        }
    }
}
