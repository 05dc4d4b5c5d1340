//! Argument binding.
//!
//! Turns an [`ExtractionContext`] into the [`Arguments`] of a resolved
//! operation, one value per declared parameter, using the bindings and
//! shapes computed when the registry was built.

use serde_json::Value;
use slate_core::{
    Arguments, OperationCandidate, ParamBinding, ParamSource, Serializer, Shape, ShapeTable,
};

use crate::body::json_body;
use crate::{ExtractionContext, ExtractionError, ExtractionSource};

/// Binds every parameter of `candidate` from the request.
///
/// Path and query strings go through [`Serializer::coerce`]. The body goes
/// through [`Serializer::decode`] after the size and media type checks.
pub fn bind_arguments(
    candidate: &OperationCandidate,
    ctx: &ExtractionContext,
    shapes: &ShapeTable,
    serializer: &dyn Serializer,
    max_body_bytes: usize,
) -> Result<Arguments, ExtractionError> {
    let mut args = Arguments::new();
    for binding in &candidate.bindings {
        let value = match binding.source {
            ParamSource::Path => bind_path(binding, ctx, shapes, serializer)?,
            ParamSource::Query => bind_query(binding, ctx, shapes, serializer)?,
            ParamSource::Body => bind_body(binding, ctx, shapes, serializer, max_body_bytes)?,
        };
        args.push(binding.name(), value);
    }
    Ok(args)
}

fn bind_path(
    binding: &ParamBinding,
    ctx: &ExtractionContext,
    shapes: &ShapeTable,
    serializer: &dyn Serializer,
) -> Result<Value, ExtractionError> {
    let raw = ctx
        .path_params()
        .get(binding.name())
        .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, binding.name()))?;
    serializer
        .coerce(raw, shapes.view(binding.shape))
        .map_err(|e| ExtractionError::invalid_type(ExtractionSource::Path, binding.name(), e))
}

fn bind_query(
    binding: &ParamBinding,
    ctx: &ExtractionContext,
    shapes: &ShapeTable,
    serializer: &dyn Serializer,
) -> Result<Value, ExtractionError> {
    let view = shapes.view(binding.shape);
    let coerce = |raw: &str, shape| {
        serializer
            .coerce(raw, shape)
            .map_err(|e| ExtractionError::invalid_type(ExtractionSource::Query, binding.name(), e))
    };

    if binding.collection {
        let list = view.unwrap_optional();
        if let Shape::List(item) = list.shape() {
            let item = list.child(*item);
            return ctx
                .query()
                .get_all(binding.name())
                .map(|raw| coerce(raw, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        }
    }

    match ctx.query().first(binding.name()) {
        Some(raw) => coerce(raw, view),
        None if binding.required => {
            Err(ExtractionError::missing(ExtractionSource::Query, binding.name()))
        }
        None => Ok(Value::Null),
    }
}

fn bind_body(
    binding: &ParamBinding,
    ctx: &ExtractionContext,
    shapes: &ShapeTable,
    serializer: &dyn Serializer,
    max_body_bytes: usize,
) -> Result<Value, ExtractionError> {
    match json_body(ctx, max_body_bytes)? {
        Some(bytes) => serializer
            .decode(bytes, shapes.view(binding.shape))
            .map_err(|e| ExtractionError::deserialization_failed(binding.name(), e)),
        None if binding.required => {
            Err(ExtractionError::missing(ExtractionSource::Body, binding.name()))
        }
        None => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;
    use http::header::CONTENT_TYPE;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;
    use slate_core::{
        ApiModel, FieldInfo, MethodInfo, ParamInfo, ServiceError, ServiceInfo, ServiceRegistry,
        TypeInfo, TypeKind, TypeRef, WebService,
    };

    struct Thing;

    impl ApiModel for Thing {
        fn type_info() -> TypeInfo {
            TypeInfo::new::<Self>(
                "Thing",
                TypeKind::Object(vec![
                    FieldInfo::new("name", TypeRef::of::<String>()),
                    FieldInfo::new("size", TypeRef::of::<Option<u32>>()),
                ]),
            )
        }
    }

    struct Things;

    impl WebService for Things {
        fn service_info() -> ServiceInfo {
            ServiceInfo::new("Things")
                .method(
                    MethodInfo::new("get_thing")
                        .param(ParamInfo::new("id", TypeRef::of::<u64>()).source(ParamSource::Path))
                        .param(ParamInfo::new("tags", TypeRef::of::<Vec<String>>()))
                        .param(ParamInfo::new("limit", TypeRef::of::<Option<u32>>())),
                )
                .method(
                    MethodInfo::new("put_thing")
                        .param(ParamInfo::new("id", TypeRef::of::<u64>()).source(ParamSource::Path))
                        .param(ParamInfo::new("thing", TypeRef::of::<Thing>())),
                )
        }

        fn invoke(&self, method: &str, _args: Arguments) -> Result<Value, ServiceError> {
            Err(ServiceError::unknown_method(method))
        }
    }

    fn registry() -> ServiceRegistry {
        ServiceRegistry::builder()
            .register("/things", || Things)
            .build()
            .unwrap()
    }

    fn bind(
        registry: &ServiceRegistry,
        index: usize,
        ctx: &ExtractionContext,
    ) -> Result<Arguments, ExtractionError> {
        bind_arguments(
            &registry.candidates()[index],
            ctx,
            registry.shapes(),
            registry.conventions().serializer(),
            64,
        )
    }

    #[test]
    fn test_path_and_query() {
        let registry = registry();
        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/things/thing/7?tags=a&tags=b&limit=3"))
            .path_param("id", "7")
            .build()
            .unwrap();

        let args = bind(&registry, 0, &ctx).unwrap();
        assert_eq!(args.get(0), Some(&json!(7)));
        assert_eq!(args.get(1), Some(&json!(["a", "b"])));
        assert_eq!(args.get(2), Some(&json!(3)));
    }

    #[test]
    fn test_missing_optionals() {
        let registry = registry();
        let ctx = ExtractionContextBuilder::new()
            .uri(Uri::from_static("/things/thing/7"))
            .path_param("id", "7")
            .build()
            .unwrap();

        let args = bind(&registry, 0, &ctx).unwrap();
        assert_eq!(args.get(1), Some(&json!([])));
        assert_eq!(args.get(2), Some(&Value::Null));
    }

    #[test]
    fn test_bad_path_value_names_parameter() {
        let registry = registry();
        let ctx = ExtractionContextBuilder::new().path_param("id", "seven").build().unwrap();

        let err = bind(&registry, 0, &ctx).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.extraction_source(), ExtractionSource::Path);
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_body() {
        let registry = registry();
        let ctx = ExtractionContextBuilder::new()
            .method(Method::PUT)
            .header(CONTENT_TYPE, "application/json")
            .path_param("id", "1")
            .body(r#"{"name":"box"}"#)
            .build()
            .unwrap();

        let args = bind(&registry, 1, &ctx).unwrap();
        assert_eq!(args.get(1), Some(&json!({"name": "box"})));
    }

    #[test]
    fn test_body_errors() {
        let registry = registry();

        let empty = ExtractionContextBuilder::new().path_param("id", "1").build().unwrap();
        let err = bind(&registry, 1, &empty).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
        assert_eq!(err.field(), Some("thing"));

        let malformed = ExtractionContextBuilder::new()
            .path_param("id", "1")
            .body("{")
            .build()
            .unwrap();
        let err = bind(&registry, 1, &malformed).unwrap_err();
        assert_eq!(err.error_code(), "DESERIALIZATION_FAILED");

        let oversized = ExtractionContextBuilder::new()
            .path_param("id", "1")
            .body(format!(r#"{{"name":"{}"}}"#, "x".repeat(100)))
            .build()
            .unwrap();
        let err = bind(&registry, 1, &oversized).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
