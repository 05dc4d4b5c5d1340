//! # Slate Docs
//!
//! OpenAPI 3.1 generation for the Slate web service framework.
//!
//! Generation runs in two steps:
//!
//! 1. [`ApiDescription::assemble`] reads a built
//!    [`ServiceRegistry`](slate_core::ServiceRegistry) and resolves every
//!    parameter, body and return type through the [`ModelResolver`].
//! 2. [`OpenApiGenerator::generate`] renders that description as an
//!    [`OpenApi`] document.
//!
//! Both steps are deterministic, so generating twice yields equal documents
//! and identical JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use slate_core::ServiceRegistry;
//! use slate_docs::{ApiDescription, OpenApiGenerator};
//!
//! let registry = ServiceRegistry::builder().build()?;
//! let description = ApiDescription::assemble(&registry)?;
//! let json = OpenApiGenerator::new()
//!     .title("My API")
//!     .version("1.0.0")
//!     .generate_json(&description)?;
//! assert!(json.contains("\"openapi\": \"3.1.0\""));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![doc(html_root_url = "https://docs.rs/slate-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod description;
mod error;
mod model;
mod openapi;

pub use description::{
    ApiDescription, BodyDescription, OperationDescription, ParameterDescription,
    ParameterLocation, DEFAULT_RESPONSE_DESCRIPTION, NO_CONTENT_DESCRIPTION,
};
pub use error::{DocsError, DocsResult};
pub use model::{FieldSchema, ModelResolver, NodeKind, SchemaRef, TypeSchemaNode, COMPONENT_PREFIX};
pub use openapi::{
    Components, Discriminator, Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter,
    ParameterIn, PathItem, RequestBody, Response, Schema, SchemaType, Server, Tag, ERROR_ENVELOPE,
};
