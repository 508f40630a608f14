use serde::{Deserialize, Serialize};

use super::rules::Matcher::Word;
use super::rules::{first_match, NormalizedName, Rule};

/// Broad family a payment program belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramCategory {
    Pandemic,
    TradeMitigation,
    Disaster,
    Dairy,
    Livestock,
    Conservation,
    Commodity,
    Other,
}

impl ProgramCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ProgramCategory::Pandemic => "Pandemic Relief",
            ProgramCategory::TradeMitigation => "Trade Mitigation",
            ProgramCategory::Disaster => "Disaster Assistance",
            ProgramCategory::Dairy => "Dairy",
            ProgramCategory::Livestock => "Livestock",
            ProgramCategory::Conservation => "Conservation",
            ProgramCategory::Commodity => "Commodity Support",
            ProgramCategory::Other => "Other",
        }
    }
}

/// Pandemic and trade programs first: their names routinely mention the
/// commodity they paid out on (`CFAP DAIRY`). Disaster comes before
/// conservation so `EMERGENCY CONSERVATION PROGRAM` is disaster relief.
pub static PROGRAM_RULES: &[Rule<ProgramCategory>] = &[
    Rule {
        id: "pandemic",
        tag: ProgramCategory::Pandemic,
        matchers: &[
            Word("CORONAVIRUS"),
            Word("COVID"),
            Word("PANDEMIC"),
            Word("CFAP"),
        ],
    },
    Rule {
        id: "trade",
        tag: ProgramCategory::TradeMitigation,
        matchers: &[
            Word("MARKET FACILITATION"),
            Word("MFP"),
            Word("TRADE MITIGATION"),
        ],
    },
    Rule {
        id: "disaster",
        tag: ProgramCategory::Disaster,
        matchers: &[
            Word("DISASTER"),
            Word("EMERGENCY"),
            Word("HURRICANE"),
            Word("WILDFIRE"),
            Word("NONINSURED"),
            Word("WHIP"),
            Word("ERP"),
            Word("NAP"),
            Word("ECP"),
            Word("EFRP"),
        ],
    },
    Rule {
        id: "dairy",
        tag: ProgramCategory::Dairy,
        matchers: &[Word("DAIRY"), Word("MILK"), Word("DMC")],
    },
    Rule {
        id: "livestock",
        tag: ProgramCategory::Livestock,
        matchers: &[
            Word("LIVESTOCK"),
            Word("LFP"),
            Word("LIP"),
            Word("ELAP"),
            Word("HONEYBEES"),
        ],
    },
    Rule {
        id: "conservation",
        tag: ProgramCategory::Conservation,
        matchers: &[
            Word("CONSERVATION"),
            Word("CRP"),
            Word("CREP"),
            Word("CSP"),
            Word("EQIP"),
            Word("WETLAND"),
            Word("GRASSLAND"),
        ],
    },
    Rule {
        id: "commodity",
        tag: ProgramCategory::Commodity,
        matchers: &[
            Word("ARC"),
            Word("PLC"),
            Word("PRICE LOSS"),
            Word("AGRICULTURE RISK"),
            Word("COMMODITY"),
            Word("MARKETING LOAN"),
            Word("LOAN DEFICIENCY"),
            Word("LDP"),
            Word("COTTON"),
            Word("PEANUT"),
            Word("SUGAR"),
        ],
    },
];

pub fn classify_program(program: &str) -> ProgramCategory {
    let name = NormalizedName::new(program);
    first_match(PROGRAM_RULES, &name)
        .map(|rule| rule.tag)
        .unwrap_or(ProgramCategory::Other)
}
