//! OpenAPI document types and rendering.
//!
//! The types here cover the subset of OpenAPI 3.1 that an
//! [`ApiDescription`] can produce:
//! <https://spec.openapis.org/oas/v3.1.0>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slate_core::HttpVerb;

use crate::description::{ApiDescription, OperationDescription, ParameterLocation};
use crate::error::{DocsError, DocsResult};
use crate::model::{NodeKind, SchemaRef, TypeSchemaNode, COMPONENT_PREFIX};

/// Name of the shared error response component.
pub const ERROR_ENVELOPE: &str = "ErrorEnvelope";

const JSON: &str = "application/json";

/// OpenAPI document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version, always `3.1.0`.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Operations by path template.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations available on one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Returns the operation for `verb`.
    pub fn operation(&self, verb: HttpVerb) -> Option<&Operation> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
        }
    }

    fn slot(&mut self, verb: HttpVerb) -> &mut Option<Operation> {
        match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Delete => &mut self.delete,
        }
    }
}

/// An API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code.
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
}

impl From<ParameterLocation> for ParameterIn {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => Self::Path,
            ParameterLocation::Query => Self::Query,
        }
    }
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    fn json(description: impl Into<String>, schema: Schema) -> Self {
        Self {
            description: description.into(),
            content: json_content(schema),
        }
    }
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}

/// API tag for grouping operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
    /// Null type.
    Null,
}

/// Tag property and tag-to-component mapping of a polymorphic schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    /// Property carrying the type tag.
    #[serde(rename = "propertyName")]
    pub property_name: String,
    /// Component reference for each tag.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// JSON Schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Schema format (e.g., "date-time", "int64").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to another schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Map value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<Box<Schema>>,
    /// Enum values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,
    /// oneOf schemas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(rename = "oneOf")]
    pub one_of: Vec<Schema>,
    /// Polymorphic tag description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

impl Schema {
    /// Create a schema of one type.
    #[must_use]
    pub fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::typed(SchemaType::String)
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed(SchemaType::Array)
        }
    }

    /// Create an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::typed(SchemaType::Object)
    }

    /// Create a string-keyed map schema.
    #[must_use]
    pub fn map(values: Schema) -> Self {
        Self {
            additional_properties: Some(Box::new(values)),
            ..Self::object()
        }
    }

    /// Create a reference to a component.
    #[must_use]
    pub fn component(name: &str) -> Self {
        Self {
            reference: Some(format!("{COMPONENT_PREFIX}{name}")),
            ..Default::default()
        }
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, desc: Option<String>) -> Self {
        self.description = desc;
        self
    }

    /// Add a property to an object schema.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark a property as required.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }
}

impl From<&SchemaRef> for Schema {
    fn from(schema: &SchemaRef) -> Self {
        match schema {
            SchemaRef::Primitive {
                schema_type,
                format,
            } => Self {
                format: format.map(str::to_string),
                ..Self::typed(*schema_type)
            },
            SchemaRef::Array(items) => Self::array(items.as_ref().into()),
            SchemaRef::Map(values) => Self::map(values.as_ref().into()),
            SchemaRef::Component(name) => Self::component(name),
            SchemaRef::Any => Self::default(),
        }
    }
}

impl From<&TypeSchemaNode> for Schema {
    fn from(node: &TypeSchemaNode) -> Self {
        let schema = match &node.kind {
            NodeKind::Object { fields } => {
                let mut schema = Self::object();
                for field in fields {
                    let property = Schema::from(&field.schema)
                        .with_description(field.documentation.clone());
                    schema = schema.property(&field.name, property);
                    if field.required {
                        schema = schema.required_property(&field.name);
                    }
                }
                schema
            }
            NodeKind::Enum { values } => Self {
                enum_values: values.iter().cloned().map(serde_json::Value::String).collect(),
                ..Self::string()
            },
            NodeKind::Polymorphic {
                discriminator,
                variants,
            } => {
                let tag = Self {
                    enum_values: discriminator
                        .mapping
                        .keys()
                        .cloned()
                        .map(serde_json::Value::String)
                        .collect(),
                    ..Self::string()
                };
                Self {
                    one_of: variants.iter().map(Schema::from).collect(),
                    discriminator: Some(discriminator.clone()),
                    ..Self::object()
                }
                .property(&discriminator.property_name, tag)
                .required_property(&discriminator.property_name)
            }
        };
        schema.with_description(node.description.clone())
    }
}

/// Renders an [`ApiDescription`] as an OpenAPI 3.1 document.
///
/// # Example
///
/// ```rust
/// use slate_docs::{ApiDescription, OpenApiGenerator};
/// use slate_core::ServiceRegistry;
///
/// let registry = ServiceRegistry::builder().build().unwrap();
/// let description = ApiDescription::assemble(&registry).unwrap();
///
/// let spec = OpenApiGenerator::new()
///     .title("Things")
///     .version("1.0.0")
///     .server("https://api.example.com", None)
///     .generate(&description)
///     .unwrap();
/// assert_eq!(spec.openapi, "3.1.0");
/// assert_eq!(spec.info.title, "Things");
/// ```
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    servers: Vec<Server>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// Create a generator titled "API", version `0.1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            servers: Vec::new(),
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Render the document.
    ///
    /// # Errors
    ///
    /// Fails when a user component is named [`ERROR_ENVELOPE`].
    pub fn generate(&self, api: &ApiDescription) -> DocsResult<OpenApi> {
        if api.schemas.contains_key(ERROR_ENVELOPE) {
            return Err(DocsError::SchemaNameCollision {
                name: ERROR_ENVELOPE.to_string(),
                first: "the built-in error response".to_string(),
                second: ERROR_ENVELOPE.to_string(),
            });
        }

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        for op in &api.operations {
            let item = paths.entry(op.path.clone()).or_default();
            *item.slot(op.verb) = Some(operation(op));
        }
        paths.sort_keys();

        let mut schemas: IndexMap<String, Schema> = api
            .schemas
            .iter()
            .map(|(name, node)| (name.clone(), Schema::from(node.as_ref())))
            .collect();
        schemas.insert(ERROR_ENVELOPE.to_string(), error_envelope());
        schemas.sort_keys();

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
            },
            servers: self.servers.clone(),
            paths,
            components: Some(Components { schemas }),
            tags: api
                .tags
                .iter()
                .map(|name| Tag {
                    name: name.clone(),
                    description: None,
                })
                .collect(),
        })
    }

    /// Render the document as pretty-printed JSON.
    pub fn generate_json(&self, api: &ApiDescription) -> DocsResult<String> {
        let spec = self.generate(api)?;
        serde_json::to_string_pretty(&spec).map_err(DocsError::from)
    }
}

fn operation(op: &OperationDescription) -> Operation {
    let parameters = op
        .parameters
        .iter()
        .map(|p| Parameter {
            name: p.name.clone(),
            location: p.location.into(),
            description: p.description.clone(),
            required: p.required,
            schema: Some(Schema::from(&p.schema)),
        })
        .collect();

    let request_body = op.request_body.as_ref().map(|body| RequestBody {
        description: body.description.clone(),
        required: body.required,
        content: json_content(Schema::from(&body.schema)),
    });

    let mut responses = IndexMap::new();
    match &op.response {
        Some(schema) => {
            let mut schema = Schema::from(schema);
            if op.response_nullable {
                schema = Schema {
                    one_of: vec![schema, Schema::typed(SchemaType::Null)],
                    ..Schema::default()
                };
            }
            responses.insert(
                "200".to_string(),
                Response::json(&op.response_description, schema),
            )
        }
        None => responses.insert(
            "204".to_string(),
            Response {
                description: op.response_description.clone(),
                content: IndexMap::new(),
            },
        ),
    };
    let mut errors = vec![("400", "Invalid request"), ("404", "No matching operation")];
    if op.request_body.is_some() {
        errors.push(("413", "Request body too large"));
        errors.push(("415", "Unsupported media type"));
    }
    errors.push(("500", "Operation failed"));
    for (status, description) in errors {
        responses.insert(
            status.to_string(),
            Response::json(description, Schema::component(ERROR_ENVELOPE)),
        );
    }

    Operation {
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        tags: op.tag.iter().cloned().collect(),
        parameters,
        request_body,
        responses,
    }
}

fn json_content(schema: Schema) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(
        JSON.to_string(),
        MediaType {
            schema: Some(schema),
        },
    );
    content
}

fn error_envelope() -> Schema {
    let category = Schema {
        enum_values: ["validation", "not_found", "configuration", "internal"]
            .into_iter()
            .map(serde_json::Value::from)
            .collect(),
        ..Schema::string()
    };
    let detail = Schema::object()
        .property("code", Schema::string())
        .property("message", Schema::string())
        .property("category", category)
        .property("parameter", Schema::string())
        .required_property("code")
        .required_property("message")
        .required_property("category");
    Schema::object()
        .property("error", detail)
        .required_property("error")
        .with_description(Some("Error returned by every failed request.".to_string()))
}
