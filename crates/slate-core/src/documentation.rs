//! Human-readable documentation lookups.
//!
//! The provider holds four independent lookups. Any of them may be absent,
//! in which case the generated description simply has no text there.

use std::fmt;
use std::sync::Arc;

use crate::metadata::Metadata;
use crate::service::{MethodInfo, ParamInfo};

type MethodLookup = Arc<dyn Fn(&MethodInfo) -> Option<String> + Send + Sync>;
type ParamLookup = Arc<dyn Fn(&ParamInfo) -> Option<String> + Send + Sync>;
type ModelLookup = Arc<dyn Fn(&Metadata) -> Option<String> + Send + Sync>;

/// Documentation text for methods, return values, parameters and models.
///
/// # Example
///
/// ```rust
/// use slate_core::{DocumentationProvider, MethodInfo, Metadata};
///
/// let docs = DocumentationProvider::builder()
///     .method(|m| m.metadata.doc_comment().map(str::to_string))
///     .method_return(|m| Some(format!("Result of {}", m.name)))
///     .build();
///
/// let method = MethodInfo::new("get_thing").with_metadata(Metadata::doc("Fetches a thing"));
/// assert_eq!(docs.method(&method).as_deref(), Some("Fetches a thing"));
/// assert_eq!(docs.method_return(&method).as_deref(), Some("Result of get_thing"));
/// assert_eq!(docs.model(&Metadata::new()), None);
/// ```
#[derive(Clone, Default)]
pub struct DocumentationProvider {
    method: Option<MethodLookup>,
    method_return: Option<MethodLookup>,
    parameter: Option<ParamLookup>,
    model: Option<ModelLookup>,
}

impl DocumentationProvider {
    /// Starts a provider with no lookups.
    pub fn builder() -> DocumentationProviderBuilder {
        DocumentationProviderBuilder::default()
    }

    /// Reads `///` doc comments for methods, parameters and models.
    ///
    /// Return values use the `returns` entry of a `Returns` annotation.
    pub fn doc_comments() -> Self {
        Self::builder()
            .method(|m| m.metadata.doc_comment().map(str::to_string))
            .method_return(|m| {
                m.metadata
                    .find("Returns")
                    .and_then(|a| a.value())
                    .map(str::to_string)
            })
            .parameter(|p| p.metadata.doc_comment().map(str::to_string))
            .model(|m| m.doc_comment().map(str::to_string))
            .build()
    }

    /// Describes a method.
    pub fn method(&self, method: &MethodInfo) -> Option<String> {
        self.method.as_ref().and_then(|f| f(method))
    }

    /// Describes a method's return value.
    pub fn method_return(&self, method: &MethodInfo) -> Option<String> {
        self.method_return.as_ref().and_then(|f| f(method))
    }

    /// Describes a parameter.
    pub fn parameter(&self, param: &ParamInfo) -> Option<String> {
        self.parameter.as_ref().and_then(|f| f(param))
    }

    /// Describes a model type or field from its annotations.
    pub fn model(&self, metadata: &Metadata) -> Option<String> {
        self.model.as_ref().and_then(|f| f(metadata))
    }
}

impl fmt::Debug for DocumentationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentationProvider")
            .field("method", &self.method.is_some())
            .field("method_return", &self.method_return.is_some())
            .field("parameter", &self.parameter.is_some())
            .field("model", &self.model.is_some())
            .finish()
    }
}

/// Builder for [`DocumentationProvider`].
#[derive(Default)]
pub struct DocumentationProviderBuilder {
    inner: DocumentationProvider,
}

impl DocumentationProviderBuilder {
    /// Sets the method lookup.
    #[must_use]
    pub fn method(
        mut self,
        lookup: impl Fn(&MethodInfo) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.method = Some(Arc::new(lookup));
        self
    }

    /// Sets the return value lookup.
    #[must_use]
    pub fn method_return(
        mut self,
        lookup: impl Fn(&MethodInfo) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.method_return = Some(Arc::new(lookup));
        self
    }

    /// Sets the parameter lookup.
    #[must_use]
    pub fn parameter(
        mut self,
        lookup: impl Fn(&ParamInfo) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.parameter = Some(Arc::new(lookup));
        self
    }

    /// Sets the model lookup.
    #[must_use]
    pub fn model(
        mut self,
        lookup: impl Fn(&Metadata) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.model = Some(Arc::new(lookup));
        self
    }

    /// Finishes the provider.
    pub fn build(self) -> DocumentationProvider {
        self.inner
    }
}
