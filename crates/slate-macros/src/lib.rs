//! Procedural macros for Slate.
//!
//! Rust has no runtime reflection, so the tables that drive dispatch and
//! documentation are generated at compile time:
//!
//! - `#[derive(ApiModel)]` describes a model type as a `slate_core::TypeInfo`
//! - `#[web_service]` describes an inherent impl block as a
//!   `slate_core::ServiceInfo` and generates the by-name invoker
//!
//! # Example
//!
//! ```rust,ignore
//! use serde::{Deserialize, Serialize};
//! use slate::prelude::*;
//!
//! /// A thing.
//! #[derive(Serialize, Deserialize, ApiModel)]
//! #[serde(rename_all = "camelCase")]
//! struct Thing {
//!     thing_id: u64,
//!     label: Option<String>,
//! }
//!
//! struct Things;
//!
//! #[web_service]
//! impl Things {
//!     /// Fetches one thing.
//!     pub fn get_thing(&self, #[api(path)] id: u64) -> Thing {
//!         Thing { thing_id: id, label: None }
//!     }
//! }
//! ```
//!
//! Generated code refers to `::slate_core`, which must be a dependency of
//! the crate using the macros.

mod model;
mod parse;
mod service;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `slate_core::ApiModel`.
///
/// | Rust shape | Reflected kind |
/// |------------|----------------|
/// | struct with named fields | `Object` |
/// | newtype struct, `#[serde(transparent)]` | the inner type |
/// | unit struct | `Unit` |
/// | enum of unit variants | `Enum` |
/// | `#[serde(tag = "...")]` enum of newtype variants | `Polymorphic` |
///
/// Serde `rename`, `rename_all`, `skip` and `default` are honoured so field,
/// variant and tag names match the wire. Doc comments and
/// `#[annotate(Name, key = "value")]` become metadata. Type parameters get an
/// `ApiModel` bound.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize, ApiModel)]
/// #[serde(tag = "className")]
/// enum SuperClass {
///     SubClass1(SubClass1),
///     SubClass2(SubClass2),
/// }
/// ```
#[proc_macro_derive(ApiModel, attributes(annotate, serde))]
pub fn derive_api_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand_api_model(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Implements `slate_core::WebService` for an inherent impl block.
///
/// Every `pub fn(&self, ..)` becomes an operation, in declaration order.
///
/// # Attributes
///
/// On methods:
/// - `#[api(path = "/things/{id}")]`: template relative to the service prefix
/// - `#[api(skip)]`: not an operation
/// - `#[annotate(Name, key = "value")]`: extra metadata
///
/// On parameters:
/// - `#[api(path)]`, `#[api(query)]`, `#[api(body)]`: pin the source
/// - `#[api(doc = "...")]`: parameter documentation
///
/// A method returning `Result<T, E>` documents `T`; `Err` is reported as an
/// invocation failure. Parameters must be owned types.
///
/// # Example
///
/// ```rust,ignore
/// #[web_service]
/// impl Things {
///     pub fn get_thing(&self, #[api(path)] id: u64) -> Result<Thing, ThingError> {
///         self.store.load(id)
///     }
///
///     #[api(skip)]
///     pub fn get_internal(&self) -> u64 {
///         0
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn web_service(attr: TokenStream, item: TokenStream) -> TokenStream {
    service::expand_web_service(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
