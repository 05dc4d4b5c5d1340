//! Typed configuration for Slate.
//!
//! Configuration is layered: defaults, then a TOML or JSON file, then
//! environment variables. Unknown keys are rejected at every layer except
//! the environment, where they are logged and ignored.
//!
//! # Example
//!
//! ```no_run
//! use slate_config::ConfigLoader;
//!
//! # fn main() -> Result<(), slate_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("slate.toml")?
//!     .with_env_prefix("SLATE")
//!     .load()?;
//!
//! println!("documenting {} v{}", config.docs.title, config.docs.version);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [verbs]
//! get = "(get|find).*"
//! put = "put.*"
//! delete = ""            # empty disables DELETE
//!
//! [naming]
//! path_style = "strip_verb_prefix"
//! path_case = "kebab"
//! type_suffix = "v1"
//! tags = "first_segment"
//!
//! [serializer]
//! ignore_unknown_fields = true
//! omit_null_fields = true
//! enum_format = "declared"
//! date_format = "rfc3339"
//!
//! [dispatch]
//! max_body_bytes = 1048576
//!
//! [docs]
//! title = "Things API"
//! version = "1.0.0"
//! servers = [{ url = "https://api.example.com" }]
//!
//! [logging]
//! level = "info,slate_server=debug"
//! format = "json"
//! ```
//!
//! # Environment Variables
//!
//! Every scalar key can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `SLATE__VERBS__GET=(get|find).*`
//! - `SLATE__NAMING__TAGS=first_segment`
//! - `SLATE__DISPATCH__MAX_BODY_BYTES=4096`
//! - `SLATE__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/slate-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{
    DispatchConfig, DocsConfig, NamingConfig, ServerConfig, SlateConfig, TagSource, VerbsConfig,
    DEFAULT_MAX_BODY_BYTES,
};
pub use error::ConfigError;
pub use loader::ConfigLoader;
