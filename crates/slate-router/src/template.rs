//! Path templates.
//!
//! A [`PathTemplate`] is an ordered list of segments, each either a literal
//! or a `{name}` placeholder. Templates are compared structurally to detect
//! routes that could both match one concrete path.

use std::fmt;

/// One segment of a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text, matched by equality after percent-decoding.
    Literal(String),
    /// Named placeholder matching any single non-empty segment.
    Placeholder(String),
}

impl Segment {
    /// Returns true if this is a placeholder segment.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Placeholder(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// Error returned when a template string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A segment opens or closes a brace without a matching pair.
    UnbalancedBraces {
        /// The offending segment.
        segment: String,
    },
    /// A placeholder has no name (`{}`).
    EmptyPlaceholder,
    /// The same placeholder name appears twice.
    DuplicatePlaceholder {
        /// The repeated name.
        name: String,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedBraces { segment } => {
                write!(f, "unbalanced braces in path segment '{segment}'")
            }
            Self::EmptyPlaceholder => f.write_str("path placeholder has no name"),
            Self::DuplicatePlaceholder { name } => {
                write!(f, "path placeholder '{{{name}}}' appears more than once")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// A parsed path template such as `/path/thing/{id}`.
///
/// Empty segments are ignored, so `/a//b/` and `/a/b` parse to the same
/// template.
///
/// # Example
///
/// ```rust
/// use slate_router::PathTemplate;
///
/// let template = PathTemplate::parse("/path/thing/{id}").unwrap();
/// assert_eq!(template.len(), 3);
/// assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["id"]);
/// assert_eq!(template.to_string(), "/path/thing/{id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template string.
    pub fn parse(path: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some("") => return Err(TemplateError::EmptyPlaceholder),
                Some(name) if name.contains(['{', '}']) => {
                    return Err(TemplateError::UnbalancedBraces {
                        segment: raw.to_string(),
                    })
                }
                Some(name) => Segment::Placeholder(name.to_string()),
                None if raw.contains(['{', '}']) => {
                    return Err(TemplateError::UnbalancedBraces {
                        segment: raw.to_string(),
                    })
                }
                None => Segment::Literal(raw.to_string()),
            };

            if let Segment::Placeholder(name) = &segment {
                if segments
                    .iter()
                    .any(|s| matches!(s, Segment::Placeholder(n) if n == name))
                {
                    return Err(TemplateError::DuplicatePlaceholder { name: name.clone() });
                }
            }
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Returns the segments of this template.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the template is the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns true if `name` is a placeholder in this template.
    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// Appends a placeholder segment.
    pub fn push_placeholder(&mut self, name: impl Into<String>) {
        self.segments.push(Segment::Placeholder(name.into()));
    }

    /// Returns true if some concrete path is matched by both templates.
    ///
    /// That holds exactly when both have the same segment count and, at every
    /// position, the literals agree or at least one side is a placeholder.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => true,
                })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
