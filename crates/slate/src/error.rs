//! Build-time errors of the facade.

use slate_config::ConfigError;
use slate_core::ConfigurationError;
use slate_docs::DocsError;
use slate_telemetry::TelemetryError;
use thiserror::Error;

/// Result type alias using [`SlateError`].
pub type SlateResult<T> = Result<T, SlateError>;

/// Anything that stops a [`Slate`](crate::Slate) from being built.
///
/// Every variant is a startup failure; nothing here is produced per request.
#[derive(Error, Debug)]
pub enum SlateError {
    /// The services and conventions do not form a consistent API.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The API description could not be produced.
    #[error(transparent)]
    Docs(#[from] DocsError),

    /// The configuration file or environment is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_message() {
        let err: SlateError = ConfigurationError::DuplicateServicePrefix {
            prefix: "/things".to_string(),
        }
        .into();
        assert!(matches!(err, SlateError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "path prefix '/things' is registered more than once"
        );

        let err: SlateError = ConfigError::validation_error("bad").into();
        assert!(matches!(err, SlateError::Config(_)));
    }
}
