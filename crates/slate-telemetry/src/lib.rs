//! Logging setup for Slate.
//!
//! Every Slate crate logs through the `tracing` macros. This crate installs
//! the `tracing-subscriber` that turns those events into output:
//!
//! | Format | Use |
//! |--------|-----|
//! | [`LogFormat::Json`] | one JSON object per line, for collectors |
//! | [`LogFormat::Pretty`] | multi-line human readable output |
//!
//! The level is an [`EnvFilter`](tracing_subscriber::EnvFilter) directive,
//! so per-crate levels such as `info,slate_core=debug` work too.
//!
//! # Example
//!
//! ```rust,no_run
//! use slate_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(operation = "Things.get_thing", "ready");
//! # Ok::<(), slate_telemetry::TelemetryError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/slate-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
