//! API description assembly.
//!
//! [`ApiDescription::assemble`] walks a built [`ServiceRegistry`] and
//! produces a format-neutral description of every operation plus the schema
//! components they reach. Verbs and templates are read from the candidates,
//! never recomputed, so the description always agrees with dispatch.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use slate_core::{HttpVerb, OperationCandidate, ParamSource, ServiceRegistry};

use crate::error::{DocsError, DocsResult};
use crate::model::{ModelResolver, SchemaRef, TypeSchemaNode};

/// Response text used when the documentation provider has none.
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful response";

/// Response text for operations that return nothing.
pub const NO_CONTENT_DESCRIPTION: &str = "No content";

/// Where a non-body parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Path placeholder
    Path,
    /// Query string key
    Query,
}

/// A path or query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescription {
    /// Parameter name
    pub name: String,
    /// Location
    pub location: ParameterLocation,
    /// Documentation
    pub description: Option<String>,
    /// Whether the parameter must be present
    pub required: bool,
    /// Value schema
    pub schema: SchemaRef,
}

/// The request body of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDescription {
    /// Name of the bound method parameter
    pub name: String,
    /// Documentation
    pub description: Option<String>,
    /// Whether a body must be sent
    pub required: bool,
    /// Body schema
    pub schema: SchemaRef,
}

/// One documented operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescription {
    /// `Service.method`
    pub operation_id: String,
    /// Full path template, e.g. `/path/thing/{id}`
    pub path: String,
    /// Verb recorded at registry build time
    pub verb: HttpVerb,
    /// Tag from the tag provider
    pub tag: Option<String>,
    /// Path and query parameters, in declaration order
    pub parameters: Vec<ParameterDescription>,
    /// Request body
    pub request_body: Option<BodyDescription>,
    /// Response schema, `None` when the method returns unit
    pub response: Option<SchemaRef>,
    /// Whether the method may answer `null` (an `Option` return)
    pub response_nullable: bool,
    /// Method documentation
    pub summary: Option<String>,
    /// Response documentation
    pub response_description: String,
}

/// Format-neutral description of an API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDescription {
    /// Operations in registration order
    pub operations: Vec<OperationDescription>,
    /// Components by name
    pub schemas: IndexMap<String, Arc<TypeSchemaNode>>,
    /// Distinct tags in first-seen order
    pub tags: Vec<String>,
}

impl ApiDescription {
    /// Describes every operation of `registry`.
    ///
    /// # Errors
    ///
    /// Fails when two types share a component name, or when a reference has
    /// no component.
    pub fn assemble(registry: &ServiceRegistry) -> DocsResult<Self> {
        let conventions = registry.conventions();
        let mut resolver = ModelResolver::new(conventions);
        let mut operations = Vec::with_capacity(registry.candidates().len());
        let mut tags: Vec<String> = Vec::new();

        for candidate in registry.candidates() {
            let operation = describe(candidate, registry, &mut resolver)?;
            if let Some(tag) = &operation.tag {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
            operations.push(operation);
        }

        let description = Self {
            operations,
            schemas: resolver.into_schemas(),
            tags,
        };
        description.validate()?;

        tracing::debug!(
            operations = description.operations.len(),
            schemas = description.schemas.len(),
            "assembled API description"
        );
        Ok(description)
    }

    /// Looks up an operation by id.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationDescription> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }

    /// Checks that every referenced component exists.
    pub fn validate(&self) -> DocsResult<()> {
        let mut missing: Option<(String, String)> = None;

        for op in &self.operations {
            let mut check = |name: &str| {
                if missing.is_none() && !self.schemas.contains_key(name) {
                    missing = Some((name.to_string(), op.operation_id.clone()));
                }
            };
            for param in &op.parameters {
                param.schema.for_each_component(&mut check);
            }
            if let Some(body) = &op.request_body {
                body.schema.for_each_component(&mut check);
            }
            if let Some(response) = &op.response {
                response.for_each_component(&mut check);
            }
        }

        for (owner, node) in &self.schemas {
            node.for_each_component(&mut |name: &str| {
                if missing.is_none() && !self.schemas.contains_key(name) {
                    missing = Some((name.to_string(), owner.clone()));
                }
            });
        }

        match missing {
            Some((name, referenced_from)) => Err(DocsError::DanglingReference {
                name,
                referenced_from,
            }),
            None => Ok(()),
        }
    }

    /// Returns the names of every component reachable from an operation.
    pub fn reachable_schemas(&self) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut pending: Vec<String> = Vec::new();
        let mut push = |name: &str| pending.push(name.to_string());

        for op in &self.operations {
            for param in &op.parameters {
                param.schema.for_each_component(&mut push);
            }
            if let Some(body) = &op.request_body {
                body.schema.for_each_component(&mut push);
            }
            if let Some(response) = &op.response {
                response.for_each_component(&mut push);
            }
        }

        while let Some(name) = pending.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(node) = self.schemas.get(&name) {
                node.for_each_component(&mut |next: &str| pending.push(next.to_string()));
            }
        }
        seen
    }
}

fn describe(
    candidate: &OperationCandidate,
    registry: &ServiceRegistry,
    resolver: &mut ModelResolver<'_>,
) -> DocsResult<OperationDescription> {
    let conventions = registry.conventions();
    let docs = conventions.documentation();
    let path = candidate.template.to_string();

    let mut parameters = Vec::new();
    let mut request_body = None;
    for binding in &candidate.bindings {
        let schema = resolver.schema_ref(binding.param.ty)?;
        let description = docs.parameter(&binding.param);
        let location = match binding.source {
            ParamSource::Path => ParameterLocation::Path,
            ParamSource::Query => ParameterLocation::Query,
            ParamSource::Body => {
                request_body = Some(BodyDescription {
                    name: binding.name().to_string(),
                    description,
                    required: binding.required,
                    schema,
                });
                continue;
            }
        };
        parameters.push(ParameterDescription {
            name: binding.name().to_string(),
            location,
            description,
            required: binding.required,
            schema,
        });
    }

    let returns = candidate.method.returns.resolve();
    let response = if matches!(returns.kind, slate_core::TypeKind::Unit) {
        None
    } else {
        Some(resolver.schema_ref(candidate.method.returns)?)
    };
    let response_nullable = matches!(returns.kind, slate_core::TypeKind::Optional(_));
    let response_description = docs.method_return(&candidate.method).unwrap_or_else(|| {
        if response.is_some() {
            DEFAULT_RESPONSE_DESCRIPTION.to_string()
        } else {
            NO_CONTENT_DESCRIPTION.to_string()
        }
    });

    Ok(OperationDescription {
        operation_id: candidate.id.clone(),
        tag: conventions.tags().tag_for(&path),
        path,
        verb: candidate.verb,
        parameters,
        request_body,
        response,
        response_nullable,
        summary: docs.method(&candidate.method),
        response_description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_core::{
        output, ApiModel, Arguments, Conventions, FieldInfo, Metadata, MethodInfo, ParamInfo,
        ServiceError, ServiceInfo, TagProvider, TypeInfo, TypeKind, TypeRef, Value, WebService,
    };

    use crate::openapi::SchemaType;

    struct Thing;

    impl ApiModel for Thing {
        fn type_info() -> TypeInfo {
            TypeInfo::new::<Self>(
                "Thing",
                TypeKind::Object(vec![FieldInfo::new("tags", TypeRef::of::<Vec<String>>())]),
            )
        }
    }

    struct Things;

    impl WebService for Things {
        fn service_info() -> ServiceInfo {
            ServiceInfo::new("Things")
                .method(
                    MethodInfo::new("get_thing")
                        .with_metadata(Metadata::doc("Fetches one thing."))
                        .param(
                            ParamInfo::new("id", TypeRef::of::<u64>())
                                .source(ParamSource::Path)
                                .with_metadata(Metadata::doc("Thing id.")),
                        )
                        .param(ParamInfo::new("verbose", TypeRef::of::<Option<bool>>()))
                        .returns(TypeRef::of::<Thing>()),
                )
                .method(
                    MethodInfo::new("put_thing")
                        .param(ParamInfo::new("thing", TypeRef::of::<Thing>())),
                )
                .method(MethodInfo::new("get_latest").returns(TypeRef::of::<Option<Thing>>()))
        }

        fn invoke(&self, method: &str, _args: Arguments) -> Result<Value, ServiceError> {
            match method {
                "get_thing" => output::from_value(&serde_json::json!({"tags": []})),
                "put_thing" | "get_latest" => Ok(Value::Null),
                _ => Err(ServiceError::unknown_method(method)),
            }
        }
    }

    fn registry() -> ServiceRegistry {
        let conventions = Conventions::builder()
            .tags(TagProvider::first_segment())
            .build()
            .unwrap();
        slate_core::RegistryBuilder::new(conventions)
            .register("/path", || Things)
            .register("/other", || Things)
            .build()
            .unwrap()
    }

    #[test]
    fn test_operations_follow_candidates() {
        let registry = registry();
        let description = ApiDescription::assemble(&registry).unwrap();

        assert_eq!(description.operations.len(), registry.candidates().len());
        for (op, candidate) in description.operations.iter().zip(registry.candidates()) {
            assert_eq!(op.verb, candidate.verb);
            assert_eq!(op.path, candidate.template.to_string());
        }
        assert_eq!(description.tags, vec!["path".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_parameters_and_body() {
        let description = ApiDescription::assemble(&registry()).unwrap();

        let get = description.operation("Things.get_thing").unwrap();
        assert_eq!(get.verb, HttpVerb::Get);
        assert_eq!(get.path, "/path/thing/{id}");
        assert_eq!(get.summary.as_deref(), Some("Fetches one thing."));
        assert_eq!(get.response_description, DEFAULT_RESPONSE_DESCRIPTION);
        assert_eq!(get.response, Some(SchemaRef::Component("Thing".into())));

        let id = &get.parameters[0];
        assert_eq!(id.location, ParameterLocation::Path);
        assert!(id.required);
        assert_eq!(id.description.as_deref(), Some("Thing id."));

        let verbose = &get.parameters[1];
        assert_eq!(verbose.location, ParameterLocation::Query);
        assert!(!verbose.required);
        assert_eq!(
            verbose.schema,
            SchemaRef::Primitive {
                schema_type: SchemaType::Boolean,
                format: None
            }
        );

        let put = description.operation("Things.put_thing").unwrap();
        assert_eq!(put.verb, HttpVerb::Put);
        assert!(put.parameters.is_empty());
        assert_eq!(put.request_body.as_ref().map(|b| b.required), Some(true));
        assert_eq!(put.response, None);
        assert_eq!(put.response_description, NO_CONTENT_DESCRIPTION);
    }

    #[test]
    fn test_option_return_is_nullable() {
        let description = ApiDescription::assemble(&registry()).unwrap();

        let latest = description.operation("Things.get_latest").unwrap();
        assert_eq!(latest.response, Some(SchemaRef::Component("Thing".into())));
        assert!(latest.response_nullable);
        assert_eq!(latest.response_description, DEFAULT_RESPONSE_DESCRIPTION);

        let get = description.operation("Things.get_thing").unwrap();
        assert!(!get.response_nullable);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let registry = registry();
        let first = ApiDescription::assemble(&registry).unwrap();
        let second = ApiDescription::assemble(&registry).unwrap();
        assert_eq!(first, second);
        assert!(first.reachable_schemas().contains("Thing"));
    }

    #[test]
    fn test_dangling_reference_is_reported() {
        let mut description = ApiDescription::assemble(&registry()).unwrap();
        description.schemas.shift_remove("Thing");
        let err = description.validate().unwrap_err();
        assert!(matches!(
            err,
            DocsError::DanglingReference { ref name, .. } if name == "Thing"
        ));
    }
}
