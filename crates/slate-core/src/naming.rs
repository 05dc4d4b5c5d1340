//! Naming conventions: path segments, schema name suffixes, and tags.

use std::fmt;
use std::sync::Arc;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::reflect::TypeInfo;
use crate::service::{MethodInfo, ParamSource};
use crate::verb::HttpVerb;

/// How a method name becomes a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStyle {
    /// Drop the leading verb word: `get_thing` becomes `thing`.
    ///
    /// Only methods classified as GET, PUT or DELETE lose their first word.
    /// A POST method keeps its whole name, so `create_thing` and
    /// `update_thing` stay distinct.
    #[default]
    StripVerbPrefix,
    /// Use every word of the method name.
    MethodName,
}

/// Word casing of a derived path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentCase {
    /// `thing-by-id`
    #[default]
    Kebab,
    /// `thingById`
    Camel,
    /// `thing_by_id`
    Snake,
}

/// Derives path templates from method names.
///
/// # Example
///
/// ```rust
/// use slate_core::{HttpVerb, MethodInfo, ParamInfo, ParamSource, PathConvention, TypeRef};
///
/// let method = MethodInfo::new("get_thing_by_id")
///     .param(ParamInfo::new("id", TypeRef::of::<u64>()).source(ParamSource::Path));
///
/// let paths = PathConvention::default();
/// assert_eq!(paths.template_for("/path", &method, HttpVerb::Get), "/path/thing-by-id/{id}");
/// assert_eq!(paths.segment_for("create_thing", HttpVerb::Post), "create-thing");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConvention {
    /// Which words to keep
    pub style: SegmentStyle,
    /// How to join them
    pub case: SegmentCase,
}

impl PathConvention {
    /// Returns the path segment for `method_name` classified as `verb`.
    pub fn segment_for(&self, method_name: &str, verb: HttpVerb) -> String {
        let snake = method_name.to_snake_case();
        let mut words: Vec<&str> = snake.split('_').filter(|w| !w.is_empty()).collect();
        let strip = self.style == SegmentStyle::StripVerbPrefix && verb != HttpVerb::Post;
        if strip && words.len() > 1 {
            words.remove(0);
        }
        let joined = words.join("_");
        match self.case {
            SegmentCase::Kebab => joined.to_kebab_case(),
            SegmentCase::Camel => joined.to_lower_camel_case(),
            SegmentCase::Snake => joined,
        }
    }

    /// Returns the full template string for `method` under `prefix`.
    ///
    /// An explicit method path replaces the derived segment. Parameters
    /// marked as path parameters but missing from the template are appended
    /// as placeholders in declaration order.
    pub fn template_for(&self, prefix: &str, method: &MethodInfo, verb: HttpVerb) -> String {
        let prefix = prefix.trim_end_matches('/');
        let relative = method
            .path
            .clone()
            .unwrap_or_else(|| self.segment_for(&method.name, verb));
        let mut template = format!("{prefix}/{}", relative.trim_start_matches('/'));

        for param in &method.params {
            let placeholder = format!("{{{}}}", param.name);
            if param.source == Some(ParamSource::Path) && !template.contains(&placeholder) {
                template.push('/');
                template.push_str(&placeholder);
            }
        }
        template
    }
}

/// Supplies a suffix that disambiguates schema names.
///
/// Returning `None` or an empty string leaves the base name unchanged. The
/// suffix is appended as `Base_suffix` to roots and subtypes alike.
#[derive(Clone)]
pub struct TypeNameProvider {
    suffix: Arc<dyn Fn(&TypeInfo) -> Option<String> + Send + Sync>,
}

impl TypeNameProvider {
    /// Wraps a suffix function.
    pub fn new(suffix: impl Fn(&TypeInfo) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            suffix: Arc::new(suffix),
        }
    }

    /// Never adds a suffix.
    pub fn none() -> Self {
        Self::new(|_| None)
    }

    /// Adds the same suffix to every named type.
    pub fn constant(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Self::new(move |_| Some(suffix.clone()))
    }

    /// Joins the names of a type's generic arguments, so `Page<Thing>`
    /// becomes `Page_Thing`.
    pub fn generic_arguments() -> Self {
        Self::new(|info| {
            let names: Vec<String> = info.generics.iter().map(|g| g.resolve().name).collect();
            (!names.is_empty()).then(|| names.join("_"))
        })
    }

    /// Returns the suffix for `info`, if non-empty.
    pub fn suffix_for(&self, info: &TypeInfo) -> Option<String> {
        (self.suffix)(info).filter(|s| !s.is_empty())
    }

    /// Returns the schema name for `info`.
    pub fn name_for(&self, info: &TypeInfo) -> String {
        match self.suffix_for(info) {
            Some(suffix) => format!("{}_{suffix}", info.name),
            None => info.name.clone(),
        }
    }
}

impl Default for TypeNameProvider {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for TypeNameProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeNameProvider").finish_non_exhaustive()
    }
}

/// Assigns an operation tag from its full path template.
#[derive(Clone)]
pub struct TagProvider {
    tag: Arc<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl TagProvider {
    /// Wraps a tag function.
    pub fn new(tag: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self { tag: Arc::new(tag) }
    }

    /// Never tags.
    pub fn none() -> Self {
        Self::new(|_| None)
    }

    /// Tags with the first path segment: `/path/thing/{id}` gets `path`.
    pub fn first_segment() -> Self {
        Self::new(|path| {
            path.split('/')
                .find(|s| !s.is_empty())
                .map(ToString::to_string)
        })
    }

    /// Tags with the `tag` capture group of a full-path match.
    ///
    /// The regex is anchored, so it must match the whole path.
    pub fn from_regex(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self::new(move |path| {
            regex
                .captures(path)
                .and_then(|c| c.name("tag"))
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        }))
    }

    /// Returns the tag for `path`.
    pub fn tag_for(&self, path: &str) -> Option<String> {
        (self.tag)(path)
    }
}

impl Default for TagProvider {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for TagProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagProvider").finish_non_exhaustive()
    }
}
