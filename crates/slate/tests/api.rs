//! End-to-end tests: macros, registry, dispatcher and OpenAPI generation
//! through the facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use slate::core::{ConfigurationError, ParamSource, TypeRef};
use slate::docs::ModelResolver;
use slate::prelude::*;

/// A thing.
#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
struct Thing {
    id: u64,
    label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
struct SubClass1 {
    radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
struct SubClass2 {
    side: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
#[serde(tag = "className")]
enum SuperClass {
    SubClass1(SubClass1),
    SubClass2(SubClass2),
}

struct Things;

#[web_service]
impl Things {
    /// Fetches one thing.
    pub fn get_thing(&self, #[api(path)] id: u64) -> Thing {
        Thing {
            id,
            label: format!("thing {id}"),
        }
    }

    pub fn put_thing(&self, #[api(path)] id: u64, thing: Thing) -> anyhow::Result<Thing> {
        anyhow::ensure!(thing.id == id, "id {} does not match body id {}", id, thing.id);
        Ok(thing)
    }

    pub fn delete_thing(&self, #[api(path)] id: u64) {
        let _ = id;
    }

    pub fn create_shape(&self, shape: SuperClass) -> SuperClass {
        shape
    }

    pub fn get_label(&self, #[api(path)] id: u64) -> Option<String> {
        (id % 2 == 0).then(|| format!("label {id}"))
    }
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Bytes> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from(body.to_string()))
            .unwrap(),
        None => builder.body(Bytes::new()).unwrap(),
    }
}

fn body(response: &http::Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn things() -> Slate {
    Slate::builder().register("/path", || Things).build().unwrap()
}

fn with_suffix(suffix: &str) -> Slate {
    let mut config = SlateConfig::default();
    config.naming.type_suffix = Some(suffix.to_string());
    Slate::builder()
        .config(config)
        .register("/path", || Things)
        .build()
        .unwrap()
}

#[test]
fn test_get_thing_binds_id_from_path() {
    let slate = things();

    let candidate = slate
        .registry()
        .candidates()
        .iter()
        .find(|c| c.id == "Things.get_thing")
        .unwrap();
    assert_eq!(candidate.verb, HttpVerb::Get);
    assert_eq!(candidate.template.to_string(), "/path/thing/{id}");
    assert_eq!(candidate.bindings[0].source, ParamSource::Path);

    let response = slate.handle(request(Method::GET, "/path/thing/42", None));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({"id": 42, "label": "thing 42"}));
}

#[test]
fn test_verb_has_a_single_source() {
    let slate = things();
    let spec = slate.openapi().unwrap();

    for (op, candidate) in slate
        .description()
        .operations
        .iter()
        .zip(slate.registry().candidates())
    {
        assert_eq!(op.verb, candidate.verb);
        assert_eq!(op.path, candidate.template.to_string());
        let rendered = spec.paths[&op.path].operation(op.verb).unwrap();
        assert_eq!(rendered.operation_id, op.operation_id);
    }

    let create = slate.description().operation("Things.create_shape").unwrap();
    assert_eq!(create.verb, HttpVerb::Post);
    assert_eq!(create.path, "/path/create-shape");
}

#[test]
fn test_polymorphic_mapping_uses_suffixed_names() {
    let slate = with_suffix("sfx");
    let doc: Value = serde_json::from_str(&slate.openapi_json().unwrap()).unwrap();
    let schemas = &doc["components"]["schemas"];

    let root = &schemas["SuperClass_sfx"];
    assert_eq!(root["discriminator"]["propertyName"], json!("className"));
    assert_eq!(
        root["discriminator"]["mapping"],
        json!({
            "SubClass1": "#/components/schemas/SubClass1_sfx",
            "SubClass2": "#/components/schemas/SubClass2_sfx",
        })
    );

    for target in root["discriminator"]["mapping"].as_object().unwrap().values() {
        let name = target
            .as_str()
            .unwrap()
            .trim_start_matches("#/components/schemas/");
        assert!(schemas.get(name).is_some(), "missing component {name}");
    }
    assert!(schemas.get("SubClass1").is_none());
    assert!(schemas.get("Thing_sfx").is_some());
}

#[test]
fn test_polymorphic_body_round_trips() {
    let slate = things();
    let response = slate.handle(request(
        Method::POST,
        "/path/create-shape",
        Some(json!({"className": "SubClass2", "side": 2.5})),
    ));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({"className": "SubClass2", "side": 2.5}));
}

#[test]
fn test_generation_is_idempotent() {
    let slate = with_suffix("sfx");
    assert_eq!(slate.openapi().unwrap(), slate.openapi().unwrap());
    assert_eq!(slate.openapi_json().unwrap(), slate.openapi_json().unwrap());

    let rebuilt = with_suffix("sfx");
    assert_eq!(slate.description(), rebuilt.description());
    assert_eq!(slate.openapi_json().unwrap(), rebuilt.openapi_json().unwrap());
}

#[test]
fn test_repeated_resolution_shares_the_node() {
    let slate = with_suffix("sfx");
    let mut resolver = ModelResolver::new(slate.registry().conventions());

    let first = resolver.resolve(TypeRef::of::<SuperClass>()).unwrap().unwrap();
    let second = resolver.resolve(TypeRef::of::<SuperClass>()).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name, "SuperClass_sfx");
}

#[test]
fn test_unmatched_path_never_calls_factory() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let slate = Slate::builder()
        .register("/path", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Things
        })
        .build()
        .unwrap();

    let response = slate.handle(request(Method::GET, "/path/nothing/1", None));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response)["error"]["code"], json!("NOT_FOUND"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = slate.handle(request(Method::GET, "/path/thing/1", None));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unit_and_failure_outcomes() {
    let slate = things();

    let response = slate.handle(request(Method::DELETE, "/path/thing/1", None));
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());

    let response = slate.handle(request(
        Method::PUT,
        "/path/thing/2",
        Some(json!({"id": 1, "label": "a"})),
    ));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&response)["error"]["code"], json!("INVOCATION_FAILED"));

    let response = slate.handle(request(Method::GET, "/path/thing/abc", None));
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["error"]["parameter"], json!("id"));
}

#[test]
fn test_option_return_agrees_with_description() {
    let slate = things();

    let response = slate.handle(request(Method::GET, "/path/label/1", None));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), Value::Null);

    let response = slate.handle(request(Method::GET, "/path/label/2", None));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!("label 2"));

    let doc: Value = serde_json::from_str(&slate.openapi_json().unwrap()).unwrap();
    let responses = &doc["paths"]["/path/label/{id}"]["get"]["responses"];
    assert!(responses.get("204").is_none());
    assert_eq!(
        responses["200"]["content"]["application/json"]["schema"]["oneOf"],
        json!([{"type": "string"}, {"type": "null"}])
    );
}

struct Overlapping;

#[web_service]
impl Overlapping {
    pub fn get_thing(&self, #[api(path)] id: u64) -> u64 {
        id
    }

    #[api(path = "thing/{name}")]
    pub fn get_by_name(&self, name: String) -> String {
        name
    }
}

#[test]
fn test_overlapping_templates_fail_build() {
    let err = Slate::builder()
        .register("/path", || Overlapping)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SlateError::Configuration(ConfigurationError::AmbiguousOperation {
            verb: HttpVerb::Get,
            ..
        })
    ));
}

struct Nested;

#[web_service]
impl Nested {
    #[api(path = "{id}")]
    pub fn get_one(&self, id: u64) -> u64 {
        id
    }
}

#[test]
fn test_collision_between_services_fails_build() {
    let err = Slate::builder()
        .register("/path", || Things)
        .register("/path/thing", || Nested)
        .build()
        .unwrap_err();
    match err {
        SlateError::Configuration(ConfigurationError::AmbiguousOperation {
            first, second, ..
        }) => {
            assert_eq!(first, "Things.get_thing");
            assert_eq!(second, "Nested.get_one");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_error_envelope_name_is_reserved() {
    #[derive(Serialize, Deserialize, ApiModel)]
    struct ErrorEnvelope {
        reason: String,
    }

    struct Reports;

    #[web_service]
    impl Reports {
        pub fn get_report(&self) -> ErrorEnvelope {
            ErrorEnvelope {
                reason: String::new(),
            }
        }
    }

    let err = Slate::builder()
        .register("/reports", || Reports)
        .build()
        .unwrap_err();
    assert!(matches!(err, SlateError::Docs(_)));
}
