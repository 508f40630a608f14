pub mod catalog;
pub mod identifiers;
pub mod query;
pub mod rows;

pub use catalog::{DimValue, Dimension, TableKind, UnknownDimension, UnknownTable};
pub use identifiers::{ContentVersion, Fips, IdentifierError, Slug, StateCode};
pub use query::{
    Condition, Direction, Metric, QueryError, QueryMetadata, QueryResult, QuerySpec, SortSpec,
};
pub use rows::{AggregateRow, RowKey};
