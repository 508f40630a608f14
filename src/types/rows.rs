use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::classify_entity;
use crate::format::{format_program_name, slugify};
use crate::types::catalog::{DimValue, Dimension};
use crate::types::identifiers::{Fips, StateCode};

/// Dimension values identifying a row. Which fields are populated depends on
/// the table's key shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fips: Option<Fips>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

impl RowKey {
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_state(mut self, state: StateCode) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_county(mut self, county: impl Into<String>, fips: Fips) -> Self {
        self.county = Some(county.into());
        self.fips = Some(fips);
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Stored value of a key dimension. Descriptive attributes are not part of the key.
    pub fn get(&self, dimension: Dimension) -> Option<DimValue> {
        match dimension {
            Dimension::Year => self.year.map(DimValue::from),
            Dimension::State => self.state.as_ref().map(|s| DimValue::Text(s.to_string())),
            Dimension::County => self.county.clone().map(DimValue::Text),
            Dimension::Fips => self.fips.as_ref().map(|f| DimValue::Text(f.to_string())),
            Dimension::Program => self.program.clone().map(DimValue::Text),
            Dimension::Recipient => self.recipient.clone().map(DimValue::Text),
            Dimension::EntityType => self.entity_type.clone().map(DimValue::Text),
            Dimension::Name | Dimension::Code => None,
        }
    }

    /// Values for every dimension of `shape`, or `None` if any is missing.
    pub fn project(&self, shape: &[Dimension]) -> Option<Vec<DimValue>> {
        shape.iter().map(|d| self.get(*d)).collect()
    }

    /// `state=IA, year=2020` style rendering for diagnostics.
    pub fn describe(&self, shape: &[Dimension]) -> String {
        shape
            .iter()
            .map(|d| match self.get(*d) {
                Some(v) => format!("{d}={v}"),
                None => format!("{d}=?"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One row of an aggregate table: a key plus the two measures every table
/// carries, and any precomputed metric columns (per-capita, dependency).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    #[serde(flatten)]
    pub key: RowKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Signed; negative values are net clawbacks.
    pub amount: f64,
    pub payments: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, f64>,
    #[serde(skip)]
    pub(crate) ordinal: usize,
}

impl AggregateRow {
    pub fn new(key: RowKey, amount: f64, payments: u64) -> Self {
        Self {
            key,
            name: None,
            code: None,
            amount,
            payments,
            columns: BTreeMap::new(),
            ordinal: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>, value: f64) -> Self {
        self.columns.insert(column.into(), value);
        self
    }

    /// Position of the row in its source table.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn column(&self, column: &str) -> Option<f64> {
        self.columns.get(column).copied()
    }

    /// Value of any addressable field, including the computed `entity_type`
    /// of recipient rows.
    pub fn attribute(&self, dimension: Dimension) -> Option<DimValue> {
        match dimension {
            Dimension::Name => self.name.clone().map(DimValue::Text),
            Dimension::Code => self.code.clone().map(DimValue::Text),
            Dimension::EntityType => self.key.get(Dimension::EntityType).or_else(|| {
                self.key
                    .recipient
                    .as_deref()
                    .map(|r| DimValue::Text(classify_entity(r).as_str().to_string()))
            }),
            other => self.key.get(other),
        }
    }

    /// Display label: the explicit name if the source provided one, otherwise
    /// derived from the most specific key dimension.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let key = &self.key;
        if let Some(recipient) = &key.recipient {
            return recipient.clone();
        }
        if let Some(county) = &key.county {
            return match &key.state {
                Some(state) => format!("{county}, {state}"),
                None => county.clone(),
            };
        }
        if let Some(program) = &key.program {
            return format_program_name(program);
        }
        if let Some(state) = &key.state {
            return state.to_string();
        }
        if let Some(entity_type) = &key.entity_type {
            return entity_type.clone();
        }
        key.year.map(|y| y.to_string()).unwrap_or_default()
    }

    /// Key under which the row's detail record or page is addressed.
    pub fn lookup_key(&self) -> String {
        let key = &self.key;
        if let Some(fips) = &key.fips {
            return fips.to_string();
        }
        if let Some(recipient) = &key.recipient {
            return slugify(recipient);
        }
        if let Some(program) = &key.program {
            return slugify(program);
        }
        if let Some(state) = &key.state {
            return state.as_str().to_ascii_lowercase();
        }
        if let Some(entity_type) = &key.entity_type {
            return slugify(entity_type);
        }
        key.year.map(|y| y.to_string()).unwrap_or_default()
    }
}
