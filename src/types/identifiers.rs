use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::format::slugify;

/// Stable lookup key derived from a free-text name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Slugging is idempotent, so passing an existing slug returns it unchanged.
    pub fn from_name(name: &str) -> Self {
        Slug(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("State code must be two ASCII letters: {0:?}")]
    InvalidStateCode(String),
    #[error("FIPS code must be one to five ASCII digits: {0:?}")]
    InvalidFips(String),
}

/// Two-letter postal code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(IdentifierError::InvalidStateCode(raw.to_string()));
        }
        Ok(StateCode(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StateCode {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StateCode::parse(&value)
    }
}

impl From<StateCode> for String {
    fn from(code: StateCode) -> Self {
        code.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Five-digit county FIPS code.
///
/// Source files sometimes carry FIPS as a number, which drops the leading
/// zero of states below 10 (`1001` for Autauga, AL). Parsing left-pads back
/// to five digits so both spellings address the same county.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fips(String);

impl Fips {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > 5 || !trimmed.chars().all(|c| c.is_ascii_digit())
        {
            return Err(IdentifierError::InvalidFips(raw.to_string()));
        }
        Ok(Fips(format!("{trimmed:0>5}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-digit state portion of the code.
    pub fn state_prefix(&self) -> &str {
        &self.0[..2]
    }
}

impl TryFrom<String> for Fips {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Fips::parse(&value)
    }
}

impl From<Fips> for String {
    fn from(fips: Fips) -> Self {
        fips.0
    }
}

impl fmt::Display for Fips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash version of a serialized table file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentVersion(String);

impl ContentVersion {
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        ContentVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
