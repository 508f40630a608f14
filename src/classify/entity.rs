use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::rules::{first_match, NormalizedName, Rule};
use super::rules::Matcher::{Prefix, Suffix, Word};

/// Coarse legal form of a payment recipient, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Individual,
    #[serde(rename = "LLC")]
    Llc,
    Corporation,
    Partnership,
    Trust,
    Estate,
    #[serde(rename = "Farm/Ranch")]
    FarmRanch,
    Cooperative,
    GovernmentEntity,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        EntityType::Individual,
        EntityType::Llc,
        EntityType::Corporation,
        EntityType::Partnership,
        EntityType::Trust,
        EntityType::Estate,
        EntityType::FarmRanch,
        EntityType::Cooperative,
        EntityType::GovernmentEntity,
    ];

    /// Tag as written in table files and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Individual => "Individual",
            EntityType::Llc => "LLC",
            EntityType::Corporation => "Corporation",
            EntityType::Partnership => "Partnership",
            EntityType::Trust => "Trust",
            EntityType::Estate => "Estate",
            EntityType::FarmRanch => "Farm/Ranch",
            EntityType::Cooperative => "Cooperative",
            EntityType::GovernmentEntity => "GovernmentEntity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityType::GovernmentEntity => "Government Entity",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown entity type: {0:?}")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted) || t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownEntityType(s.to_string()))
    }
}

/// Bumped whenever a rule is added, removed, or reordered.
pub const ENTITY_RULESET_VERSION: u32 = 2;

/// Evaluated in order. Government comes first so that an agency name that
/// also carries a corporate suffix stays a government entity; corporate
/// suffixes come before the farm keywords so `HILLTOP FARMS INC` is a
/// corporation.
pub static ENTITY_RULES: &[Rule<EntityType>] = &[
    Rule {
        id: "government",
        tag: EntityType::GovernmentEntity,
        matchers: &[
            Word("DEPT"),
            Word("DEPARTMENT"),
            Prefix("STATE OF"),
            Word("COUNTY OF"),
            Word("CITY OF"),
            Word("TOWN OF"),
            Word("VILLAGE OF"),
            Word("TOWNSHIP"),
            Word("BOARD OF"),
            Word("COMMISSION"),
            Word("COMMISSIONERS"),
            Word("DISTRICT"),
            Word("UNIVERSITY"),
            Word("AUTHORITY"),
            Word("GOVERNMENT"),
            Word("MUNICIPAL"),
            Word("BUREAU"),
            Word("TRIBE"),
            Word("TRIBAL"),
        ],
    },
    Rule {
        id: "estate",
        tag: EntityType::Estate,
        matchers: &[
            Prefix("ESTATE OF"),
            Word("EST OF"),
            Suffix("ESTATE"),
            Word("DECEASED"),
            Word("DECD"),
        ],
    },
    Rule {
        id: "trust",
        tag: EntityType::Trust,
        matchers: &[
            Word("TRUST"),
            Word("TRUSTEE"),
            Word("TRUSTEES"),
            Word("TRST"),
            Word("REVOCABLE"),
            Suffix("TR"),
        ],
    },
    Rule {
        id: "cooperative",
        tag: EntityType::Cooperative,
        matchers: &[
            Word("COOPERATIVE"),
            Word("CO OPERATIVE"),
            Word("COOP"),
            Word("CO OP"),
        ],
    },
    Rule {
        id: "llc",
        tag: EntityType::Llc,
        matchers: &[
            Word("LLC"),
            Word("L L C"),
            Word("PLLC"),
            Word("LIMITED LIABILITY COMPANY"),
        ],
    },
    Rule {
        id: "partnership",
        tag: EntityType::Partnership,
        matchers: &[
            Word("PARTNERSHIP"),
            Word("LLP"),
            Word("LLLP"),
            Word("LP"),
            Word("L P"),
            Word("JOINT VENTURE"),
        ],
    },
    Rule {
        id: "corporation",
        tag: EntityType::Corporation,
        matchers: &[
            Word("INC"),
            Word("INCORPORATED"),
            Word("CORP"),
            Word("CORPORATION"),
            Word("COMPANY"),
            Word("LTD"),
            Word("LIMITED"),
            Suffix("CO"),
        ],
    },
    // Informal partnership names; a corporate suffix outranks them.
    Rule {
        id: "partners",
        tag: EntityType::Partnership,
        matchers: &[Word("PARTNERS"), Word("BROTHERS"), Word("BROS")],
    },
    Rule {
        id: "farm-ranch",
        tag: EntityType::FarmRanch,
        matchers: &[
            Word("FARM"),
            Word("FARMS"),
            Word("RANCH"),
            Word("RANCHES"),
            Word("DAIRY"),
            Word("ORCHARD"),
            Word("ORCHARDS"),
            Word("ACRES"),
            Word("CATTLE"),
            Word("FEEDLOT"),
            Word("LIVESTOCK"),
            Word("VINEYARD"),
            Word("VINEYARDS"),
            Word("PLANTATION"),
        ],
    },
];

/// Which rule decided a classification. `rule_id` is `None` for the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub entity_type: EntityType,
    pub rule_id: Option<&'static str>,
}

/// Classify a raw recipient name. Names no rule matches are individuals.
pub fn classify_entity(raw_name: &str) -> EntityType {
    classify_explained(raw_name).entity_type
}

pub fn classify_explained(raw_name: &str) -> Classification {
    let name = NormalizedName::new(raw_name);
    match first_match(ENTITY_RULES, &name) {
        Some(rule) => Classification {
            entity_type: rule.tag,
            rule_id: Some(rule.id),
        },
        None => Classification {
            entity_type: EntityType::Individual,
            rule_id: None,
        },
    }
}
