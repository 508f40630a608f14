use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classify::{classify_entity, EntityType};
use crate::format::slugify;
use crate::store::error::DetailError;
use crate::store::store::AggregateStore;
use crate::types::{Fips, StateCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    Recipient,
    State,
    County,
}

impl DetailKind {
    pub const ALL: [DetailKind; 3] = [DetailKind::Recipient, DetailKind::State, DetailKind::County];

    pub fn dir_name(&self) -> &'static str {
        match self {
            DetailKind::Recipient => "recipients",
            DetailKind::State => "states",
            DetailKind::County => "counties",
        }
    }

    /// Canonical file stem for a caller-supplied key, or `None` if the key
    /// cannot name any record of this kind.
    ///
    /// Recipients are addressed by slug (a raw name works too), states by
    /// lowercase postal code, counties by five-digit FIPS. The output never
    /// contains path separators.
    pub fn normalize_key(&self, raw: &str) -> Option<String> {
        match self {
            DetailKind::Recipient => {
                let slug = slugify(raw);
                (!slug.is_empty()).then_some(slug)
            }
            DetailKind::State => StateCode::parse(raw)
                .ok()
                .map(|code| code.as_str().to_ascii_lowercase()),
            DetailKind::County => Fips::parse(raw).ok().map(|fips| fips.to_string()),
        }
    }

    pub(crate) fn path(&self, root: &Path, normalized_key: &str) -> PathBuf {
        root.join("details")
            .join(self.dir_name())
            .join(format!("{normalized_key}.json"))
    }
}

impl FromStr for DetailKind {
    type Err = DetailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recipient" | "recipients" => Ok(DetailKind::Recipient),
            "state" | "states" => Ok(DetailKind::State),
            "county" | "counties" => Ok(DetailKind::County),
            other => Err(DetailError::UnknownKind(other.to_string())),
        }
    }
}

/// Result of a keyed lookup. Absence is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearAmount {
    pub year: i32,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(alias = "paymentCount")]
    pub payments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramAmount {
    pub program: String,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(alias = "paymentCount")]
    pub payments: u64,
}

/// A ranked member inside a detail record (a state's top counties, a
/// county's top recipients).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedAmount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(default, alias = "paymentCount")]
    pub payments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientDetail {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fips: Option<Fips>,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(alias = "paymentCount")]
    pub payments: u64,
    #[serde(default)]
    pub yearly: Vec<YearAmount>,
    #[serde(default)]
    pub programs: Vec<ProgramAmount>,
}

impl RecipientDetail {
    /// Never stored; derived from the name on every call.
    pub fn entity_type(&self) -> EntityType {
        classify_entity(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDetail {
    pub state: StateCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(alias = "paymentCount")]
    pub payments: u64,
    #[serde(default)]
    pub yearly: Vec<YearAmount>,
    #[serde(default)]
    pub programs: Vec<ProgramAmount>,
    #[serde(default)]
    pub top_counties: Vec<NamedAmount>,
    #[serde(default)]
    pub top_recipients: Vec<NamedAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyDetail {
    pub fips: Fips,
    pub county: String,
    pub state: StateCode,
    #[serde(alias = "totalAmount")]
    pub amount: f64,
    #[serde(alias = "paymentCount")]
    pub payments: u64,
    #[serde(default)]
    pub yearly: Vec<YearAmount>,
    #[serde(default)]
    pub programs: Vec<ProgramAmount>,
    #[serde(default)]
    pub top_recipients: Vec<NamedAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detail {
    Recipient(RecipientDetail),
    State(StateDetail),
    County(CountyDetail),
}

impl Detail {
    pub fn kind(&self) -> DetailKind {
        match self {
            Detail::Recipient(_) => DetailKind::Recipient,
            Detail::State(_) => DetailKind::State,
            Detail::County(_) => DetailKind::County,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Detail::Recipient(d) => d.amount,
            Detail::State(d) => d.amount,
            Detail::County(d) => d.amount,
        }
    }

    pub fn yearly(&self) -> &[YearAmount] {
        match self {
            Detail::Recipient(d) => &d.yearly,
            Detail::State(d) => &d.yearly,
            Detail::County(d) => &d.yearly,
        }
    }
}

/// Read one detail record straight from disk. Nothing is cached here.
pub(crate) fn read_detail(
    root: &Path,
    kind: DetailKind,
    raw_key: &str,
) -> Result<Lookup<Detail>, DetailError> {
    let Some(key) = kind.normalize_key(raw_key) else {
        return Ok(Lookup::NotFound);
    };
    let path = kind.path(root, &key);

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Lookup::NotFound),
        Err(source) => return Err(DetailError::Io { path, source }),
    };

    let parsed = match kind {
        DetailKind::Recipient => serde_json::from_slice(&bytes).map(Detail::Recipient),
        DetailKind::State => serde_json::from_slice(&bytes).map(Detail::State),
        DetailKind::County => serde_json::from_slice(&bytes).map(Detail::County),
    };

    match parsed {
        Ok(detail) => Ok(Lookup::Found(detail)),
        Err(source) => Err(DetailError::Corrupt { path, source }),
    }
}

/// Request-scoped memo over detail lookups. Build one per request and drop
/// it with the response; detail records never join the long-lived snapshot.
pub struct DetailCache<'s> {
    store: &'s AggregateStore,
    entries: HashMap<(DetailKind, String), Lookup<Arc<Detail>>>,
}

impl<'s> DetailCache<'s> {
    pub fn new(store: &'s AggregateStore) -> Self {
        Self {
            store,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, kind: DetailKind, key: &str) -> Result<Lookup<Arc<Detail>>, DetailError> {
        let Some(normalized) = kind.normalize_key(key) else {
            return Ok(Lookup::NotFound);
        };
        if let Some(hit) = self.entries.get(&(kind, normalized.clone())) {
            return Ok(hit.clone());
        }

        let lookup = match self.store.detail(kind, &normalized)? {
            Lookup::Found(detail) => Lookup::Found(Arc::new(detail)),
            Lookup::NotFound => Lookup::NotFound,
        };
        self.entries.insert((kind, normalized), lookup.clone());
        Ok(lookup)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
