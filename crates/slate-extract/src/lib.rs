//! # Slate Extract
//!
//! Argument binding for resolved Slate operations.
//!
//! Once the registry has picked an operation, [`bind_arguments`] reads each
//! declared parameter from the place the registry decided it lives:
//!
//! | Source | Read from | Conversion |
//! |--------|-----------|------------|
//! | path | captured placeholder | [`Serializer::coerce`](slate_core::Serializer::coerce) |
//! | query | decoded query multimap | `coerce`, per value for collections |
//! | body | whole JSON payload | [`Serializer::decode`](slate_core::Serializer::decode) |
//!
//! ## Error Handling
//!
//! Every failure is an [`ExtractionError`] naming the source and parameter.
//!
//! ```rust
//! use slate_extract::{ExtractionError, ExtractionSource};
//!
//! let err = ExtractionError::invalid_type(ExtractionSource::Query, "limit", "expected an integer");
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! assert_eq!(err.field(), Some("limit"));
//! ```

#![doc(html_root_url = "https://docs.rs/slate-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod body;
mod context;
mod error;
mod query;

pub use bind::bind_arguments;
pub use body::{is_json, json_body, DEFAULT_MAX_BODY_BYTES};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use query::QueryParams;
