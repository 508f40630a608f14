//! Ordered-rule heuristics over free-text names.
//!
//! Rule tables are plain data (`ENTITY_RULES`, `PROGRAM_RULES`) so their
//! order and coverage can be tested apart from the classify functions.

pub mod entity;
pub mod program;
pub mod rules;

pub use entity::{
    classify_entity, classify_explained, Classification, EntityType, UnknownEntityType,
    ENTITY_RULES, ENTITY_RULESET_VERSION,
};
pub use program::{classify_program, ProgramCategory, PROGRAM_RULES};
pub use rules::{first_match, Matcher, NormalizedName, Rule};
