//! Dispatch errors and the JSON error envelope.
//!
//! [`DispatchError`] unifies everything that can go wrong between receiving
//! a request and encoding its result. Each variant maps to one HTTP status
//! and a machine-readable code, and renders to an [`ErrorEnvelope`]:
//!
//! ```json
//! {"error": {"code": "MISSING_PARAMETER", "message": "...", "category": "validation", "parameter": "q"}}
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use slate_core::{ResolveError, ServiceError};
use slate_extract::ExtractionError;
use thiserror::Error;

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request itself is malformed.
    Validation,
    /// No operation matches.
    NotFound,
    /// The registered services are inconsistent.
    Configuration,
    /// The operation failed or its result could not be encoded.
    Internal,
}

/// Failure while dispatching one request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A parameter could not be read from the request.
    #[error(transparent)]
    Binding(#[from] ExtractionError),

    /// A bound value did not convert to the declared Rust type.
    #[error("invalid value for parameter '{parameter}' of '{operation}': {reason}")]
    InvalidArgument {
        /// Operation id.
        operation: String,
        /// Parameter name.
        parameter: String,
        /// Conversion message.
        reason: String,
    },

    /// The service method returned an error.
    #[error("operation '{operation}' failed")]
    Invocation {
        /// Operation id.
        operation: String,
        /// The error the method returned.
        #[source]
        source: anyhow::Error,
    },

    /// The result could not be encoded.
    #[error("failed to encode the result of '{operation}': {reason}")]
    Serialization {
        /// Operation id.
        operation: String,
        /// Encoder message.
        reason: String,
    },
}

impl DispatchError {
    /// Wraps an error raised inside [`WebService::invoke`](slate_core::WebService::invoke).
    pub fn from_service(operation: &str, error: ServiceError) -> Self {
        let operation = operation.to_string();
        match error {
            ServiceError::Binding { parameter, reason } => Self::InvalidArgument {
                operation,
                parameter,
                reason,
            },
            ServiceError::Fault(source) => Self::Invocation { operation, source },
            ServiceError::Output(e) => Self::Serialization {
                operation,
                reason: e.to_string(),
            },
            unknown @ ServiceError::UnknownMethod(_) => Self::Invocation {
                operation,
                source: anyhow::Error::new(unknown),
            },
        }
    }

    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Resolve(ResolveError::NotFound { .. }) => ErrorCategory::NotFound,
            Self::Resolve(ResolveError::Ambiguous { .. }) => ErrorCategory::Configuration,
            Self::Resolve(ResolveError::MissingParameter { .. })
            | Self::Binding(_)
            | Self::InvalidArgument { .. } => ErrorCategory::Validation,
            Self::Invocation { .. } | Self::Serialization { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Resolve(ResolveError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Resolve(ResolveError::MissingParameter { .. }) | Self::InvalidArgument { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Binding(e) => e.status_code(),
            Self::Resolve(ResolveError::Ambiguous { .. })
            | Self::Invocation { .. }
            | Self::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve(ResolveError::NotFound { .. }) => "NOT_FOUND",
            Self::Resolve(ResolveError::Ambiguous { .. }) => "AMBIGUOUS_OPERATION",
            Self::Resolve(ResolveError::MissingParameter { .. }) => "MISSING_PARAMETER",
            Self::Binding(e) => e.error_code(),
            Self::InvalidArgument { .. } => "INVALID_PARAMETER",
            Self::Invocation { .. } => "INVOCATION_FAILED",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    /// Returns the offending parameter, if there is one.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Resolve(ResolveError::MissingParameter { parameter, .. })
            | Self::InvalidArgument { parameter, .. } => Some(parameter),
            Self::Binding(e) => e.field(),
            _ => None,
        }
    }

    /// Converts the error to its response envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                parameter: self.parameter().map(ToString::to_string),
            },
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Parameter the error concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}
