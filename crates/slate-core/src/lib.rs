//! # Slate Core
//!
//! Reflection model, conventions and the service registry for Slate.
//!
//! A service is a plain Rust type whose public methods become HTTP
//! operations. This crate holds everything both sides of the framework agree
//! on:
//!
//! - [`ApiModel`] / [`TypeInfo`] - runtime description of parameter and return types
//! - [`WebService`] - reflected method list plus a by-name invoker
//! - [`Conventions`] - verb patterns, path naming, serializer, documentation and tags
//! - [`ServiceRegistry`] - the operation table built once at startup
//! - [`Serializer`] / [`JsonSerializer`] - shape-aware JSON encoding
//!
//! Request dispatch lives in `slate-server` and schema generation in
//! `slate-docs`. Both read the same registry, so the documented API is the
//! dispatched API.

#![doc(html_root_url = "https://docs.rs/slate-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod conventions;
mod documentation;
mod error;
mod metadata;
mod naming;
mod reflect;
mod registry;
mod serializer;
mod service;
mod shape;
mod verb;

pub use conventions::{Conventions, ConventionsBuilder};
pub use documentation::{DocumentationProvider, DocumentationProviderBuilder};
pub use error::{ConfigResult, ConfigurationError, ResolveError};
pub use metadata::{Annotation, Metadata, DOC_ANNOTATION};
pub use naming::{PathConvention, SegmentCase, SegmentStyle, TagProvider, TypeNameProvider};
pub use reflect::{
    ApiModel, FieldInfo, Polymorphism, ScalarType, TypeInfo, TypeKind, TypeRef, Variant,
};
pub use registry::{
    OperationCandidate, ParamBinding, RegistryBuilder, Resolution, ServiceDescriptor,
    ServiceFactory, ServiceRegistry,
};
pub use serializer::{
    DateFormat, EnumFormat, JsonSerializer, SerializationError, Serializer, SerializerOptions,
};
pub use service::{
    output, Arguments, MethodInfo, ParamInfo, ParamSource, ServiceError, ServiceInfo, WebService,
};
pub use shape::{Shape, ShapeId, ShapeTable, ShapeView};
pub use verb::{HttpVerb, VerbClassifier, VerbPatterns};

pub use serde_json::Value;
pub use slate_router::Params;
