//! Binding error types.
//!
//! Every failure to turn request data into a method argument is an
//! [`ExtractionError`] that names where the value was read from and, when
//! known, which parameter it was meant for.

use std::fmt;

use http::StatusCode;
use slate_core::ParamSource;

/// Where a value was being read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path placeholders (e.g. `/thing/{id}`)
    Path,
    /// Query string
    Query,
    /// Request body
    Body,
    /// The `Content-Type` header
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

impl From<ParamSource> for ExtractionSource {
    fn from(source: ParamSource) -> Self {
        match source {
            ParamSource::Path => Self::Path,
            ParamSource::Query => Self::Query,
            ParamSource::Body => Self::Body,
        }
    }
}

/// Error that occurs while binding arguments.
///
/// # Example
///
/// ```rust
/// use slate_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "id");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Path);
/// assert!(err.to_string().contains("id"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Required parameter is absent
    Missing,
    /// A string could not be coerced
    InvalidType,
    /// The body could not be decoded
    DeserializationFailed,
    /// Body exceeds the configured limit
    PayloadTooLarge,
    /// Body is not JSON
    UnsupportedMediaType,
}

impl ExtractionError {
    /// Creates an error for a missing parameter.
    #[must_use]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Missing,
            message: format!("missing required {source} parameter: {field}"),
            field: Some(field),
        }
    }

    /// Creates an error for a value that does not fit its parameter type.
    #[must_use]
    pub fn invalid_type(
        source: ExtractionSource,
        field: impl Into<String>,
        details: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::InvalidType,
            message: format!("invalid {source} parameter '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Creates an error for a body that could not be decoded into `field`.
    #[must_use]
    pub fn deserialization_failed(field: impl Into<String>, error: impl fmt::Display) -> Self {
        let field = field.into();
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to decode body parameter '{field}': {error}"),
            field: Some(field),
        }
    }

    /// Creates an error for a body over the size limit.
    #[must_use]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
        }
    }

    /// Creates an error for a non-JSON body.
    #[must_use]
    pub fn unsupported_media_type(actual: &str) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type: expected JSON, got '{actual}'"),
            field: None,
        }
    }

    /// Returns the source the value was read from.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the parameter name, if known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::InvalidType
            | ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns the error code used in error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "MISSING_PARAMETER",
            ExtractionErrorKind::InvalidType => "INVALID_PARAMETER",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_error() {
        let err = ExtractionError::missing(ExtractionSource::Query, "q");

        assert_eq!(err.extraction_source(), ExtractionSource::Query);
        assert_eq!(err.field(), Some("q"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
        assert_eq!(err.to_string(), "missing required query parameter: q");
    }

    #[test]
    fn test_invalid_type_error() {
        let err =
            ExtractionError::invalid_type(ExtractionSource::Path, "id", "expected an integer");

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
        assert!(err.to_string().contains("expected an integer"));
    }

    #[test]
    fn test_body_errors() {
        let err = ExtractionError::deserialization_failed("thing", "EOF while parsing");
        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.field(), Some("thing"));
        assert_eq!(err.error_code(), "DESERIALIZATION_FAILED");

        let err = ExtractionError::payload_too_large(1024, 2048);
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("2048"));

        let err = ExtractionError::unsupported_media_type("text/plain");
        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_source_from_param_source() {
        assert_eq!(ExtractionSource::from(ParamSource::Path), ExtractionSource::Path);
        assert_eq!(ExtractionSource::from(ParamSource::Body).to_string(), "body");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
