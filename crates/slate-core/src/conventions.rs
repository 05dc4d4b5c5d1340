//! The shared convention set.
//!
//! [`Conventions`] bundles everything that both the dispatcher and the
//! schema generator must agree on. The registry holds one `Arc` of it and
//! the description assembler reads it from the registry, so there is no way
//! to configure the two sides differently.

use std::sync::Arc;

use crate::documentation::DocumentationProvider;
use crate::error::ConfigResult;
use crate::naming::{PathConvention, TagProvider, TypeNameProvider};
use crate::serializer::{JsonSerializer, Serializer, SerializerOptions};
use crate::verb::{VerbClassifier, VerbPatterns};

/// Verb patterns, naming, documentation and serialization in one place.
#[derive(Debug, Clone)]
pub struct Conventions {
    verbs: VerbClassifier,
    paths: PathConvention,
    serializer: Arc<dyn Serializer>,
    documentation: DocumentationProvider,
    type_names: TypeNameProvider,
    tags: TagProvider,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            verbs: VerbClassifier::default(),
            paths: PathConvention::default(),
            serializer: Arc::new(JsonSerializer::default()),
            documentation: DocumentationProvider::doc_comments(),
            type_names: TypeNameProvider::none(),
            tags: TagProvider::none(),
        }
    }
}

impl Conventions {
    /// Starts a builder with default settings.
    pub fn builder() -> ConventionsBuilder {
        ConventionsBuilder::default()
    }

    /// Returns the verb classifier.
    pub fn verbs(&self) -> &VerbClassifier {
        &self.verbs
    }

    /// Returns the path naming convention.
    pub fn paths(&self) -> &PathConvention {
        &self.paths
    }

    /// Returns the serializer.
    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    /// Returns the documentation provider.
    pub fn documentation(&self) -> &DocumentationProvider {
        &self.documentation
    }

    /// Returns the schema type name provider.
    pub fn type_names(&self) -> &TypeNameProvider {
        &self.type_names
    }

    /// Returns the tag provider.
    pub fn tags(&self) -> &TagProvider {
        &self.tags
    }
}

/// Builder for [`Conventions`].
///
/// # Example
///
/// ```rust
/// use slate_core::{Conventions, TypeNameProvider, VerbPatterns};
///
/// let conventions = Conventions::builder()
///     .verb_patterns(VerbPatterns::default())
///     .type_names(TypeNameProvider::constant("sfx"))
///     .build()
///     .unwrap();
/// assert_eq!(conventions.serializer().options().omit_null_fields, true);
/// ```
#[derive(Debug, Default)]
pub struct ConventionsBuilder {
    verb_patterns: Option<VerbPatterns>,
    paths: PathConvention,
    serializer: Option<Arc<dyn Serializer>>,
    documentation: Option<DocumentationProvider>,
    type_names: TypeNameProvider,
    tags: TagProvider,
}

impl ConventionsBuilder {
    /// Sets the verb patterns.
    #[must_use]
    pub fn verb_patterns(mut self, patterns: VerbPatterns) -> Self {
        self.verb_patterns = Some(patterns);
        self
    }

    /// Sets the path naming convention.
    #[must_use]
    pub fn paths(mut self, paths: PathConvention) -> Self {
        self.paths = paths;
        self
    }

    /// Uses a [`JsonSerializer`] with `options`.
    #[must_use]
    pub fn serializer_options(mut self, options: SerializerOptions) -> Self {
        self.serializer = Some(Arc::new(JsonSerializer::new(options)));
        self
    }

    /// Uses a custom serializer.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the documentation provider.
    #[must_use]
    pub fn documentation(mut self, documentation: DocumentationProvider) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Sets the schema type name provider.
    #[must_use]
    pub fn type_names(mut self, type_names: TypeNameProvider) -> Self {
        self.type_names = type_names;
        self
    }

    /// Sets the tag provider.
    #[must_use]
    pub fn tags(mut self, tags: TagProvider) -> Self {
        self.tags = tags;
        self
    }

    /// Compiles the verb patterns and finishes the set.
    pub fn build(self) -> ConfigResult<Conventions> {
        let verbs = match self.verb_patterns {
            Some(patterns) => VerbClassifier::new(&patterns)?,
            None => VerbClassifier::default(),
        };
        Ok(Conventions {
            verbs,
            paths: self.paths,
            serializer: self
                .serializer
                .unwrap_or_else(|| Arc::new(JsonSerializer::default())),
            documentation: self
                .documentation
                .unwrap_or_else(DocumentationProvider::doc_comments),
            type_names: self.type_names,
            tags: self.tags,
        })
    }
}
