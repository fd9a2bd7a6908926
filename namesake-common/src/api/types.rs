//! Shared API request/response types

use std::fmt;

use serde::{Deserialize, Serialize};

// ========================================
// Matching
// ========================================

/// One candidate name to resolve against the known corpus
///
/// # Examples
///
/// ```
/// use namesake_common::api::MatchQuery;
///
/// let query = MatchQuery::new("Rob", "Jones");
/// assert_eq!(query.first, "Rob");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub first: String,

    #[serde(default)]
    pub last: String,
}

impl MatchQuery {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }
}

/// Corpus names judged to match a query
///
/// `first` and `last` are in bucket enumeration order, not ranked by score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The query as submitted
    pub original: MatchQuery,

    /// Matching members of the first-name bucket
    pub first: Vec<String>,

    /// Matching members of the last-name bucket
    pub last: Vec<String>,
}

// ========================================
// Adding names
// ========================================

/// Which half of a name an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameField {
    First,
    Last,
}

impl fmt::Display for NameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameField::First => f.write_str("first"),
            NameField::Last => f.write_str("last"),
        }
    }
}

/// A list of names, accepted either as a comma-joined string or a JSON array
///
/// ```
/// use namesake_common::api::NameList;
///
/// let joined: NameList = serde_json::from_str(r#""Ann,Bob""#).unwrap();
/// let array: NameList = serde_json::from_str(r#"["Ann","Bob"]"#).unwrap();
/// assert_eq!(joined.into_vec(), array.into_vec());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    Joined(String),
    List(Vec<String>),
}

impl NameList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            NameList::Joined(s) => s.split(',').map(str::to_string).collect(),
            NameList::List(v) => v,
        }
    }
}

/// Body of an add request: parallel lists of first and last names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddNamesRequest {
    #[serde(default)]
    pub first: Option<NameList>,

    #[serde(default)]
    pub last: Option<NameList>,
}

/// Successful add response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddNamesResponse {
    pub status: String,

    /// Number of (first, last) pairs persisted
    pub added: usize,
}

impl AddNamesResponse {
    pub fn success(added: usize) -> Self {
        Self {
            status: "success".to_string(),
            added,
        }
    }
}
