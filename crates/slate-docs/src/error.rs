//! Error types for the documentation generation crate.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two distinct types were given the same schema name.
    #[error("schema name '{name}' is used by both {first} and {second}")]
    SchemaNameCollision {
        /// The shared component name.
        name: String,
        /// Rust path of the type that claimed the name first.
        first: String,
        /// Rust path of the conflicting type.
        second: String,
    },

    /// A polymorphic variant does not resolve to a named component, so it
    /// cannot appear in the discriminator mapping.
    #[error("variant '{tag}' of '{component}' is not a named model")]
    UnnamedVariant {
        /// Component name of the polymorphic type.
        component: String,
        /// Tag of the offending variant.
        tag: String,
    },

    /// A schema reference points at no component.
    #[error("'{referenced_from}' references missing schema '{name}'")]
    DanglingReference {
        /// Name of the missing component.
        name: String,
        /// Operation id or component name holding the reference.
        referenced_from: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::Serialization(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_collision_message() {
        let err = DocsError::SchemaNameCollision {
            name: "Thing".into(),
            first: "a::Thing".into(),
            second: "b::Thing".into(),
        };
        assert_eq!(
            err.to_string(),
            "schema name 'Thing' is used by both a::Thing and b::Thing"
        );
    }

    #[test]
    fn test_dangling_message() {
        let err = DocsError::DanglingReference {
            name: "Gone".into(),
            referenced_from: "Things.get_thing".into(),
        };
        assert!(err.to_string().contains("Gone"));
        assert!(err.to_string().contains("Things.get_thing"));
    }
}
