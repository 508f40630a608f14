use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown table: {0}")]
pub struct UnknownTable(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown field: {0}")]
pub struct UnknownDimension(pub String);

/// A field that can identify, label, or categorize a row.
///
/// Key dimensions (`year`, `state`, `county`, `fips`, `program`, `recipient`,
/// `entity_type`) form row keys. `name` and `code` are descriptive attributes
/// that filters and search may still address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    State,
    County,
    Fips,
    Program,
    Recipient,
    EntityType,
    Name,
    Code,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::State => "state",
            Dimension::County => "county",
            Dimension::Fips => "fips",
            Dimension::Program => "program",
            Dimension::Recipient => "recipient",
            Dimension::EntityType => "entity_type",
            Dimension::Name => "name",
            Dimension::Code => "code",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(Dimension::Year),
            "state" => Ok(Dimension::State),
            "county" => Ok(Dimension::County),
            "fips" => Ok(Dimension::Fips),
            "program" => Ok(Dimension::Program),
            "recipient" => Ok(Dimension::Recipient),
            "entity_type" | "entityType" => Ok(Dimension::EntityType),
            "name" => Ok(Dimension::Name),
            "code" => Ok(Dimension::Code),
            other => Err(UnknownDimension(other.to_string())),
        }
    }
}

/// A single dimension value. Years compare numerically, everything else as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimValue {
    Int(i64),
    Text(String),
}

impl DimValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DimValue::Int(v) => Some(*v),
            DimValue::Text(_) => None,
        }
    }
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimValue::Int(v) => write!(f, "{v}"),
            DimValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for DimValue {
    fn from(v: i32) -> Self {
        DimValue::Int(i64::from(v))
    }
}

impl From<&str> for DimValue {
    fn from(v: &str) -> Self {
        DimValue::Text(v.to_string())
    }
}

/// The fixed catalog of aggregate tables a snapshot may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    Yearly,
    States,
    StateYearly,
    Counties,
    Programs,
    ProgramYearly,
    TopRecipients,
    EntityTypes,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Yearly,
        TableKind::States,
        TableKind::StateYearly,
        TableKind::Counties,
        TableKind::Programs,
        TableKind::ProgramYearly,
        TableKind::TopRecipients,
        TableKind::EntityTypes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Yearly => "yearly",
            TableKind::States => "states",
            TableKind::StateYearly => "state-yearly",
            TableKind::Counties => "counties",
            TableKind::Programs => "programs",
            TableKind::ProgramYearly => "program-yearly",
            TableKind::TopRecipients => "top-recipients",
            TableKind::EntityTypes => "entity-types",
        }
    }

    /// Path of the table file relative to the snapshot root.
    pub fn file_path(&self) -> String {
        format!("tables/{}.json", self.name())
    }

    /// Dimensions that must be present on every row and that together are unique.
    pub fn key_shape(&self) -> &'static [Dimension] {
        match self {
            TableKind::Yearly => &[Dimension::Year],
            TableKind::States => &[Dimension::State],
            TableKind::StateYearly => &[Dimension::State, Dimension::Year],
            TableKind::Counties => &[Dimension::State, Dimension::County, Dimension::Fips],
            TableKind::Programs => &[Dimension::Program],
            TableKind::ProgramYearly => &[Dimension::Program, Dimension::Year],
            TableKind::TopRecipients => &[Dimension::Recipient],
            TableKind::EntityTypes => &[Dimension::EntityType],
        }
    }

    /// Whether filters and search may address `dimension` on this table.
    ///
    /// Recipient tables expose `entity_type` even though it is never stored:
    /// it is classified from the recipient name on demand.
    pub fn has_field(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Name | Dimension::Code => true,
            Dimension::EntityType if self.key_shape().contains(&Dimension::Recipient) => true,
            other => self.key_shape().contains(&other),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownTable(s.to_string()))
    }
}
