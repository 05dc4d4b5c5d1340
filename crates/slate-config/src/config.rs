//! Configuration types.
//!
//! [`SlateConfig`] is the root. Every section has defaults, so an empty file
//! is a valid configuration; unknown keys are rejected.

use serde::{Deserialize, Serialize};
use slate_core::{
    PathConvention, SegmentCase, SegmentStyle, SerializerOptions, TagProvider, TypeNameProvider,
    VerbClassifier, VerbPatterns,
};
use slate_telemetry::LogConfig;

use crate::ConfigError;

/// Default request body limit: 1 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Complete Slate configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use slate_config::SlateConfig;
///
/// let config = SlateConfig::default();
/// assert_eq!(config.verbs.get, "get.*");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SlateConfig {
    /// Verb patterns.
    #[serde(default)]
    pub verbs: VerbsConfig,

    /// Path, schema and tag naming.
    #[serde(default)]
    pub naming: NamingConfig,

    /// Wire format options.
    #[serde(default)]
    pub serializer: SerializerOptions,

    /// Request handling limits.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// OpenAPI document metadata.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LogConfig,
}

impl SlateConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - a verb or tag pattern does not compile
    /// - `dispatch.max_body_bytes` is zero
    /// - the log level does not parse
    ///
    /// and `ConfigError::ValidationError` if the `regex` tag source has no
    /// pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        VerbClassifier::new(&self.verbs.patterns())
            .map_err(|e| ConfigError::invalid_value("verbs", e.to_string()))?;

        self.naming.tag_provider()?;

        if self.dispatch.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.max_body_bytes",
                "must be greater than zero",
            ));
        }

        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Create a development preset: pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Create a production preset: JSON info logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }
}

/// Regexes selecting GET, PUT and DELETE methods by full name match.
///
/// An empty string disables the verb. Methods matching none of them are POST.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct VerbsConfig {
    /// GET pattern.
    pub get: String,
    /// PUT pattern.
    pub put: String,
    /// DELETE pattern.
    pub delete: String,
}

impl Default for VerbsConfig {
    fn default() -> Self {
        let patterns = VerbPatterns::default();
        Self {
            get: patterns.get.unwrap_or_default(),
            put: patterns.put.unwrap_or_default(),
            delete: patterns.delete.unwrap_or_default(),
        }
    }
}

impl VerbsConfig {
    /// Converts to [`VerbPatterns`], mapping empty strings to `None`.
    pub fn patterns(&self) -> VerbPatterns {
        let pattern = |s: &str| (!s.is_empty()).then(|| s.to_string());
        VerbPatterns {
            get: pattern(&self.get),
            put: pattern(&self.put),
            delete: pattern(&self.delete),
        }
    }
}

/// Where operation tags come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    /// No tags.
    #[default]
    None,
    /// The first path segment.
    FirstSegment,
    /// The `tag` group of `naming.tag_pattern`.
    Regex,
}

/// Naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Which words of the method name form the path segment.
    pub path_style: SegmentStyle,
    /// Casing of the path segment.
    pub path_case: SegmentCase,
    /// Suffix appended to every schema name as `Name_suffix`.
    pub type_suffix: Option<String>,
    /// Tag strategy.
    pub tags: TagSource,
    /// Pattern for [`TagSource::Regex`].
    pub tag_pattern: Option<String>,
}

impl NamingConfig {
    /// Returns the path convention.
    pub fn path_convention(&self) -> PathConvention {
        PathConvention {
            style: self.path_style,
            case: self.path_case,
        }
    }

    /// Returns the schema name provider.
    pub fn type_name_provider(&self) -> TypeNameProvider {
        match &self.type_suffix {
            Some(suffix) => TypeNameProvider::constant(suffix.clone()),
            None => TypeNameProvider::none(),
        }
    }

    /// Returns the tag provider.
    ///
    /// # Errors
    ///
    /// Fails when the regex strategy has no pattern or the pattern does not
    /// compile.
    pub fn tag_provider(&self) -> Result<TagProvider, ConfigError> {
        match self.tags {
            TagSource::None => Ok(TagProvider::none()),
            TagSource::FirstSegment => Ok(TagProvider::first_segment()),
            TagSource::Regex => {
                let pattern = self.tag_pattern.as_deref().ok_or_else(|| {
                    ConfigError::validation_error(
                        "naming.tag_pattern must be set when naming.tags is 'regex'",
                    )
                })?;
                TagProvider::from_regex(pattern)
                    .map_err(|e| ConfigError::invalid_value("naming.tag_pattern", e.to_string()))
            }
        }
    }
}

/// Request handling limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// OpenAPI document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    pub description: Option<String>,
    /// Server entries.
    pub servers: Vec<ServerConfig>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            servers: Vec::new(),
        }
    }
}

/// One OpenAPI server entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_telemetry::LogFormat;

    #[test]
    fn test_default_config() {
        let config = SlateConfig::default();
        assert_eq!(config.verbs.put, "put.*");
        assert_eq!(config.dispatch.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.docs.title, "API");
        assert_eq!(config.naming.tags, TagSource::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(SlateConfig::development().logging.format, LogFormat::Pretty);
        assert_eq!(SlateConfig::production().logging.format, LogFormat::Json);
    }

    #[test]
    fn test_empty_pattern_disables_verb() {
        let config = VerbsConfig {
            delete: String::new(),
            ..VerbsConfig::default()
        };
        let patterns = config.patterns();
        assert_eq!(patterns.get.as_deref(), Some("get.*"));
        assert_eq!(patterns.delete, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SlateConfig::default();
        config.verbs.get = "(".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = SlateConfig::default();
        config.dispatch.max_body_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "dispatch.max_body_bytes"
        ));

        let mut config = SlateConfig::default();
        config.logging.level = "slate=loud".to_string();
        assert!(config.validate().is_err());

        let mut config = SlateConfig::default();
        config.naming.tags = TagSource::Regex;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
        config.naming.tag_pattern = Some("/(?<tag>[a-z]+)/.*".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_naming_providers() {
        let naming = NamingConfig {
            path_case: SegmentCase::Snake,
            tags: TagSource::FirstSegment,
            ..NamingConfig::default()
        };
        assert_eq!(naming.path_convention().case, SegmentCase::Snake);
        assert_eq!(
            naming.tag_provider().unwrap().tag_for("/things/{id}").as_deref(),
            Some("things")
        );
    }
}
