pub mod detail;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod store;
pub mod table;
pub mod writer;

pub use detail::{
    CountyDetail, Detail, DetailCache, DetailKind, Lookup, NamedAmount, ProgramAmount,
    RecipientDetail, StateDetail, YearAmount,
};
pub use error::{DetailError, SnapshotError, TableError};
pub use loader::parse_table;
pub use manifest::{ManifestTableEntry, SnapshotConfig, SnapshotManifest};
pub use store::{AggregateStore, TableSource};
pub use table::{AggregateTable, LoadReport, RowIssue};
pub use writer::{SnapshotInput, SnapshotWriter};
