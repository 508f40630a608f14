use serde::{Deserialize, Serialize};

use crate::types::{Dimension, Metric, TableKind};

/// One independently ranked and capped result category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub category: String,
    /// Tables scanned for this category. Earlier sources win ranking ties.
    pub sources: Vec<TableKind>,
    /// Fields whose text is matched against the query. `name` matches the
    /// row's display label.
    pub fields: Vec<Dimension>,
    #[serde(default = "default_rank_by")]
    pub rank_by: Metric,
    /// Overrides the configured per-category cap.
    #[serde(default)]
    pub cap: Option<usize>,
}

fn default_rank_by() -> Metric {
    Metric::Amount
}

impl Facet {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            sources: Vec::new(),
            fields: Vec::new(),
            rank_by: default_rank_by(),
            cap: None,
        }
    }

    pub fn source(mut self, kind: TableKind) -> Self {
        self.sources.push(kind);
        self
    }

    pub fn field(mut self, field: Dimension) -> Self {
        self.fields.push(field);
        self
    }

    pub fn rank_by(mut self, metric: Metric) -> Self {
        self.rank_by = metric;
        self
    }

    pub fn cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }
}

/// Geography, programs, recipients and entity types, ranked by amount.
pub fn default_facets() -> Vec<Facet> {
    vec![
        Facet::new("geography")
            .source(TableKind::States)
            .source(TableKind::Counties)
            .field(Dimension::Name)
            .field(Dimension::State)
            .field(Dimension::County)
            .field(Dimension::Fips),
        Facet::new("programs")
            .source(TableKind::Programs)
            .field(Dimension::Name)
            .field(Dimension::Program)
            .field(Dimension::Code),
        Facet::new("recipients")
            .source(TableKind::TopRecipients)
            .field(Dimension::Recipient)
            .field(Dimension::Name),
        Facet::new("entity_types")
            .source(TableKind::EntityTypes)
            .field(Dimension::EntityType)
            .field(Dimension::Name),
    ]
}
