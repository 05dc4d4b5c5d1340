//! Annotations attached to reflected types, fields, methods and parameters.
//!
//! Doc comments are recorded as the [`DOC_ANNOTATION`] annotation with a
//! single `value` entry. Anything else comes from `#[annotate(...)]`.

use indexmap::IndexMap;

/// Name of the annotation that carries `///` doc comments.
pub const DOC_ANNOTATION: &str = "doc";

/// A named annotation with ordered `key = value` entries.
///
/// # Example
///
/// ```rust
/// use slate_core::Annotation;
///
/// let note = Annotation::new("Documentation")
///     .with("value", "Fetches a thing")
///     .with("returns", "The thing");
///
/// assert_eq!(note.name(), "Documentation");
/// assert_eq!(note.get("returns"), Some("The thing"));
/// assert_eq!(note.value(), Some("Fetches a thing"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotation {
    name: String,
    values: IndexMap<String, String>,
}

impl Annotation {
    /// Creates an annotation with no entries.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    /// Adds an entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the annotation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the conventional `value` entry.
    pub fn value(&self) -> Option<&str> {
        self.get("value")
    }

    /// Iterates over entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The ordered annotation set of one reflected element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    annotations: Vec<Annotation>,
}

impl Metadata {
    /// Creates an empty annotation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding only a doc comment.
    #[must_use]
    pub fn doc(text: impl Into<String>) -> Self {
        Self::new().with(Annotation::new(DOC_ANNOTATION).with("value", text))
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the first annotation called `name`.
    pub fn find(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Returns the doc comment text, if any.
    pub fn doc_comment(&self) -> Option<&str> {
        self.find(DOC_ANNOTATION).and_then(Annotation::value)
    }

    /// Iterates over all annotations.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Returns true if there are no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
