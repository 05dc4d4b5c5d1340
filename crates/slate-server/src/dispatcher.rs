//! Request dispatch.
//!
//! [`Dispatcher`] turns an `http::Request<Bytes>` into an
//! `http::Response<Bytes>` using a built [`ServiceRegistry`]:
//!
//! 1. map the method to a verb and resolve the operation
//! 2. bind arguments from path, query and body
//! 3. create a fresh service instance and invoke the method
//! 4. encode the result (204 for unit)
//!
//! Transport concerns such as sockets, timeouts and TLS are left to the
//! caller, which hands complete requests to [`Dispatcher::handle`].

use std::sync::Arc;

use bytes::Bytes;
use http::{header, Request, Response, StatusCode};
use slate_core::{HttpVerb, ResolveError, ServiceRegistry, Shape};
use slate_extract::{bind_arguments, ExtractionContext, DEFAULT_MAX_BODY_BYTES};

use crate::DispatchError;

/// `application/json` content type for responses.
const JSON: &str = "application/json";

/// Stateless request dispatcher over a shared registry.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use bytes::Bytes;
/// use http::{Request, StatusCode};
/// use slate_core::{output, Arguments, MethodInfo, ServiceError, ServiceInfo, ServiceRegistry, TypeRef, Value, WebService};
/// use slate_server::Dispatcher;
///
/// struct Health;
///
/// impl WebService for Health {
///     fn service_info() -> ServiceInfo {
///         ServiceInfo::new("Health").method(MethodInfo::new("get_status").returns(TypeRef::of::<String>()))
///     }
///
///     fn invoke(&self, method: &str, _args: Arguments) -> Result<Value, ServiceError> {
///         match method {
///             "get_status" => output::from_value(&"ok"),
///             _ => Err(ServiceError::unknown_method(method)),
///         }
///     }
/// }
///
/// let registry = ServiceRegistry::builder().register("/health", || Health).build().unwrap();
/// let dispatcher = Dispatcher::new(Arc::new(registry));
///
/// let response = dispatcher.handle(Request::get("/health/status").body(Bytes::new()).unwrap());
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#""ok""#);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
    max_body_bytes: usize,
}

impl Dispatcher {
    /// Creates a dispatcher with the default body limit.
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Sets the maximum accepted body size.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Returns the maximum accepted body size.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Dispatches a request and returns the encoded result.
    ///
    /// `Ok(None)` means the method returns unit. An `Option` return that
    /// is `None` encodes as `null`.
    pub fn dispatch(&self, request: Request<Bytes>) -> Result<Option<Bytes>, DispatchError> {
        let path = request.uri().path().to_string();
        let verb = HttpVerb::from_method(request.method()).ok_or_else(|| ResolveError::NotFound {
            verb: request.method().to_string(),
            path: path.clone(),
        })?;

        let ctx = ExtractionContext::from_request(request, Default::default())?;
        let resolution = self.registry.resolve(verb, &path, ctx.query().keys())?;
        let candidate = resolution.candidate;
        let ctx = ctx.with_path_params(resolution.params);

        let serializer = self.registry.conventions().serializer();
        let shapes = self.registry.shapes();
        let args = bind_arguments(candidate, &ctx, shapes, serializer, self.max_body_bytes)?;

        let service = candidate.service.instantiate();
        let result = service
            .invoke(&candidate.method.name, args)
            .map_err(|e| DispatchError::from_service(&candidate.id, e))?;

        if matches!(shapes.get(candidate.returns), Shape::Unit) {
            return Ok(None);
        }
        let bytes = serializer
            .encode(result, shapes.view(candidate.returns))
            .map_err(|e| DispatchError::Serialization {
                operation: candidate.id.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(operation = %candidate.id, "dispatched");
        Ok(Some(Bytes::from(bytes)))
    }

    /// Dispatches a request and renders the outcome as a response.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let span = tracing::debug_span!(
            "dispatch",
            method = %request.method(),
            path = %request.uri().path(),
        );
        let _guard = span.enter();

        match self.dispatch(request) {
            Ok(Some(body)) => json_response(StatusCode::OK, body),
            Ok(None) => Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Bytes::new())
                .unwrap_or_else(|_| Response::new(Bytes::new())),
            Err(error) => self.error_response(&error),
        }
    }

    fn error_response(&self, error: &DispatchError) -> Response<Bytes> {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                code = error.error_code(),
                error = %error,
                cause = %source_chain(error),
                "request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                code = error.error_code(),
                error = %error,
                "request rejected"
            );
        }

        let body = serde_json::to_vec(&error.to_envelope()).unwrap_or_default();
        json_response(status, Bytes::from(body))
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSON)
        .body(body)
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}

fn source_chain(error: &DispatchError) -> String {
    let mut chain = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::Method;
    use serde_json::{json, Value};
    use slate_core::{
        output, Arguments, MethodInfo, ParamInfo, ParamSource, ServiceError, ServiceInfo,
        TypeRef, WebService,
    };

    struct Things;

    impl WebService for Things {
        fn service_info() -> ServiceInfo {
            let id = || ParamInfo::new("id", TypeRef::of::<u64>()).source(ParamSource::Path);
            ServiceInfo::new("Things")
                .method(MethodInfo::new("get_thing").param(id()).returns(TypeRef::of::<String>()))
                .method(MethodInfo::new("delete_thing").param(id()))
                .method(MethodInfo::new("get_broken").returns(TypeRef::of::<String>()))
                .method(
                    MethodInfo::new("get_maybe")
                        .param(id())
                        .returns(TypeRef::of::<Option<String>>()),
                )
                .method(
                    MethodInfo::new("echo")
                        .param(ParamInfo::new("payload", TypeRef::of::<Value>()))
                        .returns(TypeRef::of::<Value>()),
                )
        }

        fn invoke(&self, method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
            match method {
                "get_thing" => output::from_value(&format!("thing {}", args.take::<u64>(0)?)),
                "delete_thing" => output::from_value(&args.take::<u64>(0).map(|_| ())?),
                "get_broken" => output::from_result::<String, _>(Err(anyhow::anyhow!("boom"))),
                "get_maybe" => {
                    let id = args.take::<u64>(0)?;
                    output::from_value(&(id > 0).then(|| format!("maybe {id}")))
                }
                "echo" => output::from_value(&args.take::<Value>(0)?),
                _ => Err(ServiceError::unknown_method(method)),
            }
        }
    }

    fn counting_dispatcher(created: Arc<AtomicUsize>) -> Dispatcher {
        let registry = ServiceRegistry::builder()
            .register("/path", move || {
                created.fetch_add(1, Ordering::SeqCst);
                Things
            })
            .build()
            .unwrap();
        Dispatcher::new(Arc::new(registry)).with_max_body_bytes(128)
    }

    fn dispatcher() -> Dispatcher {
        counting_dispatcher(Arc::default())
    }

    fn request(method: Method, uri: &str, body: impl Into<Bytes>) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(body.into())
            .unwrap()
    }

    fn envelope(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_get_by_path() {
        let response = dispatcher().handle(request(Method::GET, "/path/thing/42", ""));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON);
        assert_eq!(response.body().as_ref(), br#""thing 42""#);
    }

    #[test]
    fn test_unit_result_is_no_content() {
        let response = dispatcher().handle(request(Method::DELETE, "/path/thing/1", ""));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_none_is_null_not_no_content() {
        let dispatcher = dispatcher();

        let response = dispatcher.handle(request(Method::GET, "/path/maybe/0", ""));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"null");

        let response = dispatcher.handle(request(Method::GET, "/path/maybe/3", ""));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), br#""maybe 3""#);
    }

    #[test]
    fn test_not_found_never_creates_a_service() {
        let created = Arc::new(AtomicUsize::new(0));
        let dispatcher = counting_dispatcher(Arc::clone(&created));

        let response = dispatcher.handle(request(Method::GET, "/path/nothing/1", ""));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(envelope(&response)["error"]["code"], "NOT_FOUND");

        let response = dispatcher.handle(request(Method::PATCH, "/path/thing/1", ""));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(created.load(Ordering::SeqCst), 0);

        dispatcher.handle(request(Method::GET, "/path/thing/1", ""));
        dispatcher.handle(request(Method::GET, "/path/thing/2", ""));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_bad_path_value() {
        let response = dispatcher().handle(request(Method::GET, "/path/thing/abc", ""));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = envelope(&response);
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
        assert_eq!(body["error"]["parameter"], "id");
    }

    #[test]
    fn test_invocation_failure() {
        let response = dispatcher().handle(request(Method::GET, "/path/broken", ""));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope(&response)["error"]["code"], "INVOCATION_FAILED");
    }

    #[test]
    fn test_body_round_trip_and_limits() {
        let dispatcher = dispatcher();

        let response = dispatcher.handle(request(Method::POST, "/path/echo", r#"{"a":[1,2]}"#));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(envelope(&response), json!({"a": [1, 2]}));

        let big = format!("[{}1]", "1,".repeat(100));
        let response = dispatcher.handle(request(Method::POST, "/path/echo", big));
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let text = Request::post("/path/echo")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Bytes::from_static(b"hi"))
            .unwrap();
        assert_eq!(dispatcher.handle(text).status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let response = dispatcher.handle(request(Method::POST, "/path/echo", ""));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(envelope(&response)["error"]["parameter"], "payload");
    }
}
