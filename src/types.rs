//! Data types and structures for the pypic application

use crate::error::{PypicError, Result};
use serde::{Deserialize, Serialize};

/// One package hit parsed from a search results page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SearchResult {
    /// Package name as shown in the result link
    pub name: Option<String>,

    /// Version shown next to the name
    pub version: Option<String>,

    /// Relevance score assigned by the index
    pub weight: Option<i64>,

    /// One-line package summary
    pub desc: Option<String>,
}

/// A value supplied for a [`SearchResult`] field by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl SearchResult {
    /// Field names a search result carries
    pub const FIELDS: [&'static str; 4] = ["name", "version", "weight", "desc"];

    /// Create a result with every field absent
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from named fields.
    ///
    /// Every name is checked before anything is assigned, so an unknown field
    /// never yields a partially filled result.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let fields: Vec<(K, FieldValue)> = fields
            .into_iter()
            .map(|(k, v)| (k, v.into()))
            .collect();

        for (key, _) in &fields {
            let key: &str = key.as_ref();
            if !Self::FIELDS.contains(&key) {
                return Err(PypicError::UnknownField(key.to_string()));
            }
        }

        let mut result = Self::new();
        for (key, value) in fields {
            let key: &str = key.as_ref();
            match (key, value) {
                ("weight", FieldValue::Integer(w)) => result.weight = Some(w),
                ("weight", FieldValue::Text(_)) => {
                    return Err(PypicError::invalid_type("integer", "text"))
                }
                (_, FieldValue::Integer(_)) => {
                    return Err(PypicError::invalid_type("string", "integer"))
                }
                ("name", FieldValue::Text(s)) => result.name = Some(s),
                ("version", FieldValue::Text(s)) => result.version = Some(s),
                (_, FieldValue::Text(s)) => result.desc = Some(s),
            }
        }

        Ok(result)
    }
}

/// One package to check in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Name as supplied by the caller
    pub name: String,
    /// Name after normalization
    pub normalized_name: String,
    /// Specific version to check, if any
    pub version: Option<String>,
}

/// Parsed batch existence-check input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInput {
    pub entries: Vec<BatchEntry>,
}

/// Outcome of checking a single package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCheck {
    pub name: String,
    pub normalized_name: String,
    pub version: Option<String>,
    pub exists: bool,
    pub error: Option<String>,
}
