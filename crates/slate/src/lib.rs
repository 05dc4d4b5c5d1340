//! # Slate
//!
//! **Plain Rust services as an HTTP API, with an OpenAPI description that
//! always matches what is dispatched.**
//!
//! Service authors write methods. Slate derives everything else from
//! conventions:
//!
//! - the HTTP verb, from regexes over the method name (`get.*` is GET)
//! - the path, from the service prefix and the method name
//! - where each parameter is read from: path, query or body
//! - the schema of every parameter and return type, polymorphic
//!   hierarchies included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use slate::prelude::*;
//!
//! #[derive(Serialize, Deserialize, ApiModel)]
//! struct Thing {
//!     id: u64,
//! }
//!
//! struct Things;
//!
//! #[web_service]
//! impl Things {
//!     /// Fetches one thing.
//!     pub fn get_thing(&self, #[api(path)] id: u64) -> Thing {
//!         Thing { id }
//!     }
//! }
//!
//! fn main() -> Result<(), SlateError> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("slate.toml")?
//!         .with_env_prefix("SLATE")
//!         .load()?;
//!
//!     let slate = Slate::builder()
//!         .config(config)
//!         .install_logging(true)
//!         .register("/path", || Things)
//!         .build()?;
//!
//!     // GET /path/thing/{id}
//!     println!("{}", slate.openapi_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! services ─► RegistryBuilder ─► ServiceRegistry ─┬─► Dispatcher      (per request)
//!                 ▲                               └─► ApiDescription  (at startup)
//!            Conventions                                   │
//!  (verbs, paths, names, tags, docs, serializer)           ▼
//!                                                   OpenApiGenerator
//! ```
//!
//! Transport is left to the caller: [`Slate::handle`] takes a complete
//! `http::Request<Bytes>` and returns an `http::Response<Bytes>`.

#![doc(html_root_url = "https://docs.rs/slate/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;

pub use app::{Slate, SlateBuilder};
pub use error::{SlateError, SlateResult};

// Re-export the member crates
pub use slate_config as config;
pub use slate_core as core;
pub use slate_docs as docs;
pub use slate_extract as extract;
pub use slate_router as router;
pub use slate_server as server;
pub use slate_telemetry as telemetry;

pub use slate_macros::{web_service, ApiModel};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use slate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Slate, SlateBuilder, SlateError, SlateResult};

    pub use slate_core::{
        ApiModel, Conventions, DocumentationProvider, HttpVerb, ServiceError, ServiceRegistry,
        TagProvider, TypeNameProvider, VerbPatterns, WebService,
    };

    pub use slate_config::{ConfigLoader, SlateConfig};
    pub use slate_docs::{ApiDescription, OpenApiGenerator};
    pub use slate_server::{Dispatcher, ErrorEnvelope};
    pub use slate_telemetry::LogConfig;

    pub use slate_macros::{web_service, ApiModel};
}
