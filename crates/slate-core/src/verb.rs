//! HTTP verb inference from method names.

use std::fmt;

use http::Method;
use regex::Regex;

use crate::error::ConfigurationError;

/// The HTTP verbs an operation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `POST`, the default when no pattern matches.
    Post,
}

impl HttpVerb {
    /// Returns the matching [`http::Method`].
    pub fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Post => Method::POST,
        }
    }

    /// Maps an [`http::Method`] to a verb, if it is one of the four.
    pub fn from_method(method: &Method) -> Option<Self> {
        [Self::Get, Self::Put, Self::Delete, Self::Post]
            .into_iter()
            .find(|verb| verb.method() == *method)
    }

    /// Returns the lowercase name used as an OpenAPI path item key.
    pub const fn as_lowercase(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Regex sources for the non-default verbs. `None` disables a verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbPatterns {
    /// Pattern selecting GET methods
    pub get: Option<String>,
    /// Pattern selecting PUT methods
    pub put: Option<String>,
    /// Pattern selecting DELETE methods
    pub delete: Option<String>,
}

impl Default for VerbPatterns {
    fn default() -> Self {
        Self {
            get: Some("get.*".to_string()),
            put: Some("put.*".to_string()),
            delete: Some("delete.*".to_string()),
        }
    }
}

impl VerbPatterns {
    /// Patterns that match nothing, so every method is POST.
    pub fn none() -> Self {
        Self {
            get: None,
            put: None,
            delete: None,
        }
    }
}

/// Classifies method names into verbs by full-string regex match.
///
/// # Example
///
/// ```rust
/// use slate_core::{HttpVerb, VerbClassifier, VerbPatterns};
///
/// let classifier = VerbClassifier::new(&VerbPatterns::default()).unwrap();
/// assert_eq!(classifier.classify("get_thing").unwrap(), HttpVerb::Get);
/// assert_eq!(classifier.classify("create_thing").unwrap(), HttpVerb::Post);
/// // Full match only: "forget" does not start with "get".
/// assert_eq!(classifier.classify("forget").unwrap(), HttpVerb::Post);
/// ```
#[derive(Debug, Clone)]
pub struct VerbClassifier {
    patterns: Vec<(HttpVerb, Regex)>,
}

impl VerbClassifier {
    /// Compiles the patterns, anchoring each one to the whole name.
    pub fn new(patterns: &VerbPatterns) -> Result<Self, ConfigurationError> {
        let sources = [
            (HttpVerb::Get, &patterns.get),
            (HttpVerb::Put, &patterns.put),
            (HttpVerb::Delete, &patterns.delete),
        ];

        let mut compiled = Vec::new();
        for (verb, source) in sources {
            let Some(source) = source else { continue };
            let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
                ConfigurationError::InvalidVerbPattern {
                    verb,
                    pattern: source.clone(),
                    reason: e.to_string(),
                }
            })?;
            compiled.push((verb, regex));
        }
        Ok(Self { patterns: compiled })
    }

    /// Returns the verb for `method_name`.
    ///
    /// Fails if more than one pattern matches. Names matching no pattern
    /// are POST.
    pub fn classify(&self, method_name: &str) -> Result<HttpVerb, ConfigurationError> {
        let matched: Vec<HttpVerb> = self
            .patterns
            .iter()
            .filter(|(_, regex)| regex.is_match(method_name))
            .map(|(verb, _)| *verb)
            .collect();

        match matched.as_slice() {
            [] => Ok(HttpVerb::Post),
            [verb] => Ok(*verb),
            _ => Err(ConfigurationError::AmbiguousVerb {
                method: method_name.to_string(),
                verbs: matched,
            }),
        }
    }
}

impl Default for VerbClassifier {
    fn default() -> Self {
        let patterns = [
            (HttpVerb::Get, "get"),
            (HttpVerb::Put, "put"),
            (HttpVerb::Delete, "delete"),
        ]
        .into_iter()
        .filter_map(|(verb, prefix)| {
            Regex::new(&format!("^(?:{prefix}.*)$"))
                .ok()
                .map(|regex| (verb, regex))
        })
        .collect();
        Self { patterns }
    }
}
