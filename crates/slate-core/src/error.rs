//! Error types for registry construction and request resolution.
//!
//! [`ConfigurationError`] is fatal and surfaces when the registry is built.
//! [`ResolveError`] is per request. The two never mix: a registry that
//! built successfully can only fail resolution with "not found", "missing
//! parameter" or, if the table was somehow made inconsistent, "ambiguous".

use thiserror::Error;

use crate::service::ParamSource;
use crate::verb::HttpVerb;

/// Result type alias using [`ConfigurationError`].
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// A service set that cannot be turned into a consistent API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A method name matched more than one verb pattern.
    #[error("method '{method}' matches more than one verb pattern: {verbs:?}")]
    AmbiguousVerb {
        /// Method name.
        method: String,
        /// Every verb whose pattern matched.
        verbs: Vec<HttpVerb>,
    },

    /// A verb pattern is not a valid regular expression.
    #[error("invalid {verb} pattern '{pattern}': {reason}")]
    InvalidVerbPattern {
        /// The verb the pattern selects.
        verb: HttpVerb,
        /// Pattern source.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// A method declares more than one body parameter.
    #[error("operation '{operation}' has more than one body parameter: {parameters:?}")]
    MultipleBodyParameters {
        /// Operation id.
        operation: String,
        /// Names of the body parameters.
        parameters: Vec<String>,
    },

    /// Two operations with the same verb can match the same path.
    #[error("operations '{first}' and '{second}' both match {verb} {template}")]
    AmbiguousOperation {
        /// Shared verb.
        verb: HttpVerb,
        /// Template of the rejected operation.
        template: String,
        /// Operation registered first.
        first: String,
        /// Operation that was rejected.
        second: String,
    },

    /// A template placeholder names no parameter.
    #[error("operation '{operation}' has path placeholder '{{{placeholder}}}' with no matching parameter")]
    UnboundPathPlaceholder {
        /// Operation id.
        operation: String,
        /// Placeholder name.
        placeholder: String,
    },

    /// A parameter cannot be read from the source it is bound to.
    #[error("parameter '{parameter}' of operation '{operation}' cannot bind from {source_kind}: {reason}")]
    InvalidParameterSource {
        /// Operation id.
        operation: String,
        /// Parameter name.
        parameter: String,
        /// The offending source.
        source_kind: ParamSource,
        /// Why not.
        reason: String,
    },

    /// A path template failed to parse.
    #[error("operation '{operation}' has an invalid path template '{template}': {reason}")]
    InvalidTemplate {
        /// Operation id.
        operation: String,
        /// Template text.
        template: String,
        /// Parser message.
        reason: String,
    },

    /// A service prefix is not a usable path.
    #[error("invalid service path prefix '{prefix}': {reason}")]
    InvalidPathPrefix {
        /// The prefix as given.
        prefix: String,
        /// Why not.
        reason: String,
    },

    /// Two services were registered under the same prefix.
    #[error("path prefix '{prefix}' is registered more than once")]
    DuplicateServicePrefix {
        /// The shared prefix.
        prefix: String,
    },
}

/// Failure to pick exactly one operation for a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No operation matches the verb and path.
    #[error("no operation matches {verb} {path}")]
    NotFound {
        /// Request verb.
        verb: String,
        /// Request path.
        path: String,
    },

    /// More than one operation matches.
    #[error("{verb} {path} matches more than one operation: {candidates:?}")]
    Ambiguous {
        /// Request verb.
        verb: String,
        /// Request path.
        path: String,
        /// Ids of every matching operation.
        candidates: Vec<String>,
    },

    /// The operation requires a query parameter the request lacks.
    #[error("missing required query parameter '{parameter}' for operation '{operation}'")]
    MissingParameter {
        /// Operation id.
        operation: String,
        /// Parameter name.
        parameter: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_messages() {
        let err = ConfigurationError::AmbiguousOperation {
            verb: HttpVerb::Get,
            template: "/path/thing/{id}".into(),
            first: "A.get_thing".into(),
            second: "B.get_thing".into(),
        };
        assert_eq!(
            err.to_string(),
            "operations 'A.get_thing' and 'B.get_thing' both match GET /path/thing/{id}"
        );

        let err = ConfigurationError::UnboundPathPlaceholder {
            operation: "A.get".into(),
            placeholder: "id".into(),
        };
        assert!(err.to_string().contains("'{id}'"));
    }

    #[test]
    fn test_resolve_error_messages() {
        let err = ResolveError::NotFound {
            verb: "GET".into(),
            path: "/nowhere".into(),
        };
        assert_eq!(err.to_string(), "no operation matches GET /nowhere");
    }
}
