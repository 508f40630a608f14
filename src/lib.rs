//! Query engine over pre-aggregated government payment statistics.
//!
//! `payments-core` loads immutable aggregate tables from a content-versioned
//! snapshot, answers filter/sort/top-N, share-of-total, cross-tab and
//! histogram queries over them, runs faceted substring search, and classifies
//! recipient names into entity types. Tables are read once per store and
//! never mutated; every query is answered from that in-memory snapshot.

pub mod classify;
pub mod config;
pub mod engine;
pub mod format;
pub mod query;
pub mod search;
pub mod store;
pub mod types;

pub use classify::{classify_entity, EntityType};
pub use config::StoreConfig;
pub use engine::{EngineError, PaymentsEngine};
pub use format::{format_count, format_money, format_program_name, slugify, title_case};
pub use query::{run_query, View};
pub use search::{FacetedSearch, SearchResults};
pub use store::{AggregateStore, AggregateTable};
