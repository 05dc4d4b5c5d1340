//! Reflected web services.
//!
//! A service is a plain Rust type whose public methods become API
//! operations. `#[web_service]` on an inherent `impl` block generates the
//! [`WebService`] implementation: a [`ServiceInfo`] describing every method
//! and an `invoke` that decodes [`Arguments`] and calls the method by name.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::metadata::Metadata;
use crate::reflect::TypeRef;

/// Where a parameter value is read from in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// A `{name}` segment of the path template.
    Path,
    /// A query string key.
    Query,
    /// The request body.
    Body,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        })
    }
}

/// Reflected method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    /// Parameter name as declared
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
    /// Explicit source marker, if any
    pub source: Option<ParamSource>,
    /// Annotations
    pub metadata: Metadata,
}

impl ParamInfo {
    /// Creates a parameter with an inferred source.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            source: None,
            metadata: Metadata::new(),
        }
    }

    /// Pins the parameter to a source.
    #[must_use]
    pub fn source(mut self, source: ParamSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Reflected service method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// Method name as declared
    pub name: String,
    /// Explicit path template, relative to the service prefix
    pub path: Option<String>,
    /// Parameters, in declaration order
    pub params: Vec<ParamInfo>,
    /// Success type
    pub returns: TypeRef,
    /// Annotations
    pub metadata: Metadata,
}

impl MethodInfo {
    /// Creates a method with no parameters returning `()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            params: Vec::new(),
            returns: TypeRef::of::<()>(),
            metadata: Metadata::new(),
        }
    }

    /// Overrides the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the success type.
    #[must_use]
    pub fn returns(mut self, returns: TypeRef) -> Self {
        self.returns = returns;
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Reflected service: its type name and methods.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    /// Service type name
    pub name: String,
    /// Methods, in declaration order
    pub methods: Vec<MethodInfo>,
    /// Annotations
    pub metadata: Metadata,
}

impl ServiceInfo {
    /// Creates a service description with no methods.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Appends a method.
    #[must_use]
    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Error raised while invoking a service method.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A bound argument could not be converted to the declared type.
    #[error("invalid value for parameter '{parameter}': {reason}")]
    Binding {
        /// Parameter name.
        parameter: String,
        /// What went wrong.
        reason: String,
    },

    /// The method returned an error.
    #[error(transparent)]
    Fault(anyhow::Error),

    /// The return value could not be converted to JSON.
    #[error("failed to encode return value: {0}")]
    Output(#[source] serde_json::Error),

    /// No method with this name exists on the service.
    #[error("service has no method '{0}'")]
    UnknownMethod(String),
}

impl ServiceError {
    /// Creates an [`ServiceError::UnknownMethod`] error.
    pub fn unknown_method(method: &str) -> Self {
        Self::UnknownMethod(method.to_string())
    }
}

/// A reflected service object.
///
/// A fresh instance is created for every request, so `invoke` takes
/// `&self` and implementations need not be `Sync`.
pub trait WebService: Send + 'static {
    /// Describes the service and its methods.
    fn service_info() -> ServiceInfo
    where
        Self: Sized;

    /// Calls `method` with already-bound arguments.
    fn invoke(&self, method: &str, args: Arguments) -> Result<Value, ServiceError>;
}

/// Bound argument values, one per declared parameter.
///
/// Absent optional values are stored as `null`, which deserializes to
/// `None` for `Option` parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the value for the next parameter.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    /// Returns the number of bound values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no values are bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw value at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// Moves the value at `index` out and converts it to `T`.
    pub fn take<T: DeserializeOwned>(&mut self, index: usize) -> Result<T, ServiceError> {
        let Some((name, value)) = self.values.get_mut(index) else {
            return Err(ServiceError::Binding {
                parameter: format!("#{index}"),
                reason: "no value bound".to_string(),
            });
        };
        serde_json::from_value(std::mem::take(value)).map_err(|e| ServiceError::Binding {
            parameter: name.clone(),
            reason: e.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Converts method return values into JSON for [`WebService::invoke`].
pub mod output {
    use super::{Serialize, ServiceError, Value};

    /// Encodes a plain return value.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Value, ServiceError> {
        serde_json::to_value(value).map_err(ServiceError::Output)
    }

    /// Encodes a `Result` return value, surfacing `Err` as a fault.
    pub fn from_result<T, E>(result: Result<T, E>) -> Result<Value, ServiceError>
    where
        T: Serialize,
        E: Into<anyhow::Error>,
    {
        match result {
            Ok(value) => from_value(&value),
            Err(e) => Err(ServiceError::Fault(e.into())),
        }
    }
}
