//! Per-request view used for binding.
//!
//! [`ExtractionContext`] owns the parts of an HTTP request that arguments are
//! bound from: placeholder values captured during resolution, the decoded
//! query multimap, headers and the raw body.

use bytes::Bytes;
use http::{header, HeaderMap, Method, Request, Uri};
use slate_core::Params;

use crate::{ExtractionError, QueryParams};

/// Request data available to argument binding.
///
/// # Example
///
/// ```rust
/// use slate_extract::ExtractionContext;
/// use slate_core::Params;
/// use http::Request;
/// use bytes::Bytes;
///
/// let request = Request::get("/path/thing/7?verbose=true").body(Bytes::new()).unwrap();
/// let mut params = Params::new();
/// params.push("id", "7");
///
/// let ctx = ExtractionContext::from_request(request, params).unwrap();
/// assert_eq!(ctx.path(), "/path/thing/7");
/// assert_eq!(ctx.query().first("verbose"), Some("true"));
/// assert_eq!(ctx.path_params().get("id"), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    query: QueryParams,
}

impl ExtractionContext {
    /// Creates a context, decoding the query string from `uri`.
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
    ) -> Result<Self, ExtractionError> {
        let query = QueryParams::parse(uri.query())?;
        Ok(Self {
            method,
            uri,
            headers,
            body,
            path_params,
            query,
        })
    }

    /// Creates a context from a whole request.
    pub fn from_request(
        request: Request<Bytes>,
        path_params: Params,
    ) -> Result<Self, ExtractionError> {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body, path_params)
    }

    /// Replaces the captured placeholder values.
    #[must_use]
    pub fn with_path_params(mut self, path_params: Params) -> Self {
        self.path_params = path_params;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the decoded query string.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the captured placeholder values.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the `Content-Type` header, if it is valid text.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Builder for [`ExtractionContext`], mostly used in tests.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
}

impl ExtractionContextBuilder {
    /// Creates a new builder for `GET /`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Adds a header. Values that are not valid header text are skipped.
    #[must_use]
    pub fn header(mut self, name: header::HeaderName, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a captured placeholder value.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Builds the context.
    pub fn build(self) -> Result<ExtractionContext, ExtractionError> {
        ExtractionContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.path_params,
        )
    }
}
