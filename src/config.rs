use serde::{Deserialize, Serialize};

/// Store-wide settings. `Default` is `v0()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub tolerance: Tolerance,
    /// Recompute each table's content hash on load and compare it to the manifest.
    pub verify_versions: bool,
    pub search: SearchConfig,
}

impl StoreConfig {
    pub fn v0() -> Self {
        Self {
            tolerance: Tolerance::v0(),
            verify_versions: true,
            search: SearchConfig::v0(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::v0()
    }
}

/// Allowed gap between an aggregate and the sum of its finer-grained rows.
///
/// Finer tables may legitimately drop small correction rows, so exact
/// equality is too strict; the larger of the two bounds applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub absolute: f64,
    pub relative: f64,
}

impl Tolerance {
    pub fn v0() -> Self {
        Self {
            absolute: 0.01,
            relative: 0.0,
        }
    }

    pub fn allows(&self, expected: f64, actual: f64) -> bool {
        let bound = self.absolute.max(self.relative * expected.abs());
        (expected - actual).abs() <= bound
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::v0()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shorter queries (in characters, after trimming) return nothing.
    pub min_query_len: usize,
    pub per_category_cap: usize,
}

impl SearchConfig {
    pub fn v0() -> Self {
        Self {
            min_query_len: 2,
            per_category_cap: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::v0()
    }
}
