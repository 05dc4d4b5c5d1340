//! Layered configuration loading.
//!
//! Later layers override earlier ones:
//! 1. Default values
//! 2. A configuration file (TOML or JSON)
//! 3. Environment variables, optionally seeded from a `.env` file

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{ConfigError, SlateConfig};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use slate_config::ConfigLoader;
///
/// # fn main() -> Result<(), slate_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("slate.toml")?
///     .with_dotenv()?
///     .with_env_prefix("SLATE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SlateConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from [`SlateConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SlateConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from an explicit configuration, e.g. a preset.
    ///
    /// # Example
    ///
    /// ```
    /// use slate_config::{ConfigLoader, SlateConfig};
    ///
    /// let config = ConfigLoader::from_config(SlateConfig::development())
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn from_config(config: SlateConfig) -> Self {
        Self {
            config,
            env_prefix: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. The file
    /// replaces the current configuration; sections it omits take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// has an unknown extension, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                ConfigError::validation_error(format!(
                    "unsupported configuration file format: {}",
                    path.display()
                ))
            })?;
        self.config = parse(&content, &format)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// # Example
    ///
    /// ```
    /// use slate_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [docs]
    ///     title = "Things"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.docs.title, "Things");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the prefix for environment overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `SLATE__DISPATCH__MAX_BODY_BYTES=4096`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the working directory into the process environment.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvParseError` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::env_parse_error(".env", e.to_string())),
        }
    }

    /// Load a specific dotenv file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        dotenvy::from_path(path)
            .map_err(|e| ConfigError::env_parse_error(path.display().to_string(), e.to_string()))?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<SlateConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SlateConfig {
        self.config
    }

    fn apply_overrides(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(path) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["VERBS", "GET"] => config.verbs.get = value.to_string(),
            ["VERBS", "PUT"] => config.verbs.put = value.to_string(),
            ["VERBS", "DELETE"] => config.verbs.delete = value.to_string(),

            ["NAMING", "PATH_STYLE"] => config.naming.path_style = parse_enum(key, value)?,
            ["NAMING", "PATH_CASE"] => config.naming.path_case = parse_enum(key, value)?,
            ["NAMING", "TYPE_SUFFIX"] => config.naming.type_suffix = non_empty(value),
            ["NAMING", "TAGS"] => config.naming.tags = parse_enum(key, value)?,
            ["NAMING", "TAG_PATTERN"] => config.naming.tag_pattern = non_empty(value),

            ["SERIALIZER", "IGNORE_UNKNOWN_FIELDS"] => {
                config.serializer.ignore_unknown_fields = parse_bool(key, value)?;
            }
            ["SERIALIZER", "OMIT_NULL_FIELDS"] => {
                config.serializer.omit_null_fields = parse_bool(key, value)?;
            }
            ["SERIALIZER", "ENUM_FORMAT"] => {
                config.serializer.enum_format = parse_enum(key, value)?;
            }
            ["SERIALIZER", "DATE_FORMAT"] => {
                config.serializer.date_format = parse_enum(key, value)?;
            }

            ["DISPATCH", "MAX_BODY_BYTES"] => {
                config.dispatch.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            ["DOCS", "TITLE"] => config.docs.title = value.to_string(),
            ["DOCS", "VERSION"] => config.docs.version = value.to_string(),
            ["DOCS", "DESCRIPTION"] => config.docs.description = non_empty(value),

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => config.logging.format = parse_enum(key, value)?,
            ["LOGGING", "ANSI"] => config.logging.ansi = parse_bool(key, value)?,

            _ => tracing::warn!(var = key, "ignoring unknown configuration override"),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<SlateConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::validation_error(format!(
            "unsupported configuration format: {format}"
        ))),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

/// Parses a unit enum through its serde names, so `first_segment` and
/// `FIRST_SEGMENT` both work.
fn parse_enum<T: DeserializeOwned>(key: &str, value: &str) -> Result<T, ConfigError> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))
}
