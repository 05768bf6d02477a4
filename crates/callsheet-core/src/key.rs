//! Natural keys.
//!
//! Source systems identify records by a published natural key (a slug, a
//! machine name, a platform name). Matching is case-insensitive and ignores
//! surrounding whitespace, so keys normalize once at construction and compare
//! exactly afterwards.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A normalized natural key: trimmed, lowercased, never blank.
///
/// `NaturalKey::new` is the only way to build one, so every key in the system
/// is already in canonical form and plain equality is case-insensitive
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NaturalKey(String);

impl NaturalKey {
    /// Normalizes `raw` into a key. Returns `None` when the key is blank
    /// after trimming; callers treat such records as skippable defects.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The canonical key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NaturalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NaturalKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).ok_or_else(|| serde::de::Error::custom("natural key is blank"))
    }
}
