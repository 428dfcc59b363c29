//! Normalized resource identifiers.
//!
//! The upstream catalog service is loose about identifier shapes: the same
//! product may arrive as the JSON number `7` in one payload and the string
//! `"7"` in another. `ResourceId` canonicalizes both shapes to one comparable
//! string form so every comparison site (line matching, overlay lookups,
//! membership checks) works on normalized keys instead of coercing at the
//! point of use.
//!
//! Normalization is pure and total: it never fails and never collapses two
//! distinct identifiers into one.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A normalized resource identifier.
///
/// Two identifiers denote the same resource iff their normalized forms are
/// equal. Numeric sources normalize to their base-10 decimal form, so
/// `ResourceId::from(7)` and `ResourceId::from("7")` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Get the normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the normalized string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Wire payloads carry ids as either a JSON number or a JSON string.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Uint(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self::from(n),
            Raw::Uint(n) => Self::from(n),
            Raw::Text(s) => Self::from(s),
        })
    }
}
