//! Query string parsing.
//!
//! Query strings are kept as an ordered multimap so a repeated key can bind
//! to a collection parameter (`?tag=a&tag=b`).

use crate::{ExtractionError, ExtractionSource};

/// Decoded `key=value` pairs from a query string.
///
/// # Example
///
/// ```rust
/// use slate_extract::QueryParams;
///
/// let query = QueryParams::parse(Some("tag=a&tag=b&q=rust+lang")).unwrap();
/// assert_eq!(query.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(query.first("q"), Some("rust lang"));
/// assert!(!query.contains("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses a raw query string, without the leading `?`.
    pub fn parse(query: Option<&str>) -> Result<Self, ExtractionError> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(Self::default());
        };
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(|e| {
            ExtractionError::invalid_type(ExtractionSource::Query, "<query string>", e)
        })?;
        Ok(Self { pairs })
    }

    /// Returns every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first value for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` appears at least once.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Returns every key, in order, with repeats.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// Returns true if the query string had no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
