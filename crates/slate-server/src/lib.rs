//! # Slate Server
//!
//! Request dispatch for the Slate web service framework.
//!
//! The [`Dispatcher`] owns no transport. It takes complete
//! `http::Request<Bytes>` values, resolves them against a
//! [`ServiceRegistry`](slate_core::ServiceRegistry), binds arguments,
//! invokes a fresh service instance and returns an `http::Response<Bytes>`.
//!
//! | Outcome | Status |
//! |---------|--------|
//! | value returned | 200 with JSON |
//! | unit returned | 204 |
//! | no matching operation | 404 |
//! | binding failure | 400 (413 / 415 for body size or media type) |
//! | ambiguous match | 500 `AMBIGUOUS_OPERATION` |
//! | method returned `Err` | 500 `INVOCATION_FAILED` |
//!
//! Errors are rendered as an [`ErrorEnvelope`].

#![doc(html_root_url = "https://docs.rs/slate-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod error;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, ErrorCategory, ErrorDetail, ErrorEnvelope};
