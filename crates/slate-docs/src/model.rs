//! Model resolution.
//!
//! [`ModelResolver`] turns reflected [`TypeInfo`] into schema nodes. Scalars,
//! lists and maps stay inline as a [`SchemaRef`]. Objects, enums and
//! polymorphic roots become named components, one [`TypeSchemaNode`] per
//! Rust type, cached behind an `Arc`.
//!
//! Component names come from the [`TypeNameProvider`](slate_core::TypeNameProvider)
//! and apply to roots and subtypes alike, so a discriminator mapping value is
//! always the subtype's own component path.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use slate_core::{Conventions, DateFormat, ScalarType, TypeInfo, TypeKind, TypeRef};

use crate::error::{DocsError, DocsResult};
use crate::openapi::{Discriminator, SchemaType};

/// Prefix of every component reference.
pub const COMPONENT_PREFIX: &str = "#/components/schemas/";

/// A schema as seen from its point of use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    /// Inline primitive
    Primitive {
        /// JSON type
        schema_type: SchemaType,
        /// Optional format qualifier
        format: Option<&'static str>,
    },
    /// Inline array
    Array(Box<SchemaRef>),
    /// Inline string-keyed map
    Map(Box<SchemaRef>),
    /// Named component
    Component(String),
    /// Unconstrained
    Any,
}

impl SchemaRef {
    fn primitive(schema_type: SchemaType, format: Option<&'static str>) -> Self {
        Self::Primitive {
            schema_type,
            format,
        }
    }

    /// Calls `visit` with every component name this reference reaches directly.
    pub fn for_each_component(&self, visit: &mut impl FnMut(&str)) {
        match self {
            Self::Component(name) => visit(name),
            Self::Array(inner) | Self::Map(inner) => inner.for_each_component(visit),
            Self::Primitive { .. } | Self::Any => {}
        }
    }
}

/// One field of an object component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Wire name
    pub name: String,
    /// Text from the documentation provider
    pub documentation: Option<String>,
    /// Field schema
    pub schema: SchemaRef,
    /// Whether the field must be present
    pub required: bool,
}

/// Structure of a named component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Record with named fields.
    Object {
        /// Fields in declaration order.
        fields: Vec<FieldSchema>,
    },
    /// Closed set of strings, already rendered with the serializer's enum format.
    Enum {
        /// Allowed values.
        values: Vec<String>,
    },
    /// Tagged union.
    Polymorphic {
        /// Tag property and tag-to-component mapping.
        discriminator: Discriminator,
        /// One reference per concrete type.
        variants: Vec<SchemaRef>,
    },
}

/// A named schema component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchemaNode {
    /// Component name
    pub name: String,
    /// Type-level documentation
    pub description: Option<String>,
    /// Structure
    pub kind: NodeKind,
}

impl TypeSchemaNode {
    /// Calls `visit` with every component this node references.
    pub fn for_each_component(&self, visit: &mut impl FnMut(&str)) {
        match &self.kind {
            NodeKind::Object { fields } => {
                for field in fields {
                    field.schema.for_each_component(visit);
                }
            }
            NodeKind::Enum { .. } => {}
            NodeKind::Polymorphic {
                discriminator,
                variants,
            } => {
                for variant in variants {
                    variant.for_each_component(visit);
                }
                for target in discriminator.mapping.values() {
                    visit(target.strip_prefix(COMPONENT_PREFIX).unwrap_or(target));
                }
            }
        }
    }
}

/// Resolves reflected types into schema references and components.
///
/// # Example
///
/// ```rust
/// use slate_core::{ApiModel, Conventions, FieldInfo, TypeInfo, TypeKind, TypeRef};
/// use slate_docs::{ModelResolver, SchemaRef};
/// use std::sync::Arc;
///
/// struct Thing;
///
/// impl ApiModel for Thing {
///     fn type_info() -> TypeInfo {
///         TypeInfo::new::<Self>("Thing", TypeKind::Object(vec![FieldInfo::new("name", TypeRef::of::<String>())]))
///     }
/// }
///
/// let conventions = Conventions::default();
/// let mut resolver = ModelResolver::new(&conventions);
///
/// let by_ref = resolver.schema_ref(TypeRef::of::<Vec<Thing>>()).unwrap();
/// assert_eq!(by_ref, SchemaRef::Array(Box::new(SchemaRef::Component("Thing".into()))));
///
/// let first = resolver.resolve(TypeRef::of::<Thing>()).unwrap().unwrap();
/// let second = resolver.resolve(TypeRef::of::<Thing>()).unwrap().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug)]
pub struct ModelResolver<'a> {
    conventions: &'a Conventions,
    names: HashMap<TypeId, String>,
    owners: HashMap<String, String>,
    nodes: IndexMap<String, Arc<TypeSchemaNode>>,
}

impl<'a> ModelResolver<'a> {
    /// Creates an empty resolver.
    pub fn new(conventions: &'a Conventions) -> Self {
        Self {
            conventions,
            names: HashMap::new(),
            owners: HashMap::new(),
            nodes: IndexMap::new(),
        }
    }

    /// Returns the reference to use for `ty`, resolving components as needed.
    pub fn schema_ref(&mut self, ty: TypeRef) -> DocsResult<SchemaRef> {
        let info = ty.resolve();
        Ok(match &info.kind {
            TypeKind::Unit => SchemaRef::primitive(SchemaType::Null, None),
            TypeKind::Any => SchemaRef::Any,
            TypeKind::Scalar(scalar) => self.scalar(*scalar),
            TypeKind::Optional(inner) => self.schema_ref(*inner)?,
            TypeKind::List(inner) => SchemaRef::Array(Box::new(self.schema_ref(*inner)?)),
            TypeKind::Map(inner) => SchemaRef::Map(Box::new(self.schema_ref(*inner)?)),
            TypeKind::Enum(_) | TypeKind::Object(_) | TypeKind::Polymorphic(_) => {
                SchemaRef::Component(self.component(&info)?)
            }
        })
    }

    /// Returns the component node for `ty`.
    ///
    /// `Option` wrappers are looked through. Types that render inline yield
    /// `None`. Repeated calls return the same `Arc`.
    pub fn resolve(&mut self, ty: TypeRef) -> DocsResult<Option<Arc<TypeSchemaNode>>> {
        let mut info = ty.resolve();
        while let TypeKind::Optional(inner) = info.kind {
            info = inner.resolve();
        }
        if !info.kind.is_named() {
            return Ok(None);
        }
        let name = self.component(&info)?;
        Ok(self.nodes.get(&name).cloned())
    }

    /// Returns every component resolved so far, in resolution order.
    pub fn schemas(&self) -> &IndexMap<String, Arc<TypeSchemaNode>> {
        &self.nodes
    }

    /// Consumes the resolver and returns its components.
    pub fn into_schemas(self) -> IndexMap<String, Arc<TypeSchemaNode>> {
        self.nodes
    }

    fn scalar(&self, scalar: ScalarType) -> SchemaRef {
        let epoch = self.conventions.serializer().options().date_format == DateFormat::EpochMillis;
        match scalar {
            ScalarType::String => SchemaRef::primitive(SchemaType::String, None),
            ScalarType::Boolean => SchemaRef::primitive(SchemaType::Boolean, None),
            ScalarType::Int32 => SchemaRef::primitive(SchemaType::Integer, Some("int32")),
            ScalarType::Int64 => SchemaRef::primitive(SchemaType::Integer, Some("int64")),
            ScalarType::Float => SchemaRef::primitive(SchemaType::Number, Some("float")),
            ScalarType::Double => SchemaRef::primitive(SchemaType::Number, Some("double")),
            ScalarType::DateTime if epoch => {
                SchemaRef::primitive(SchemaType::Integer, Some("int64"))
            }
            ScalarType::DateTime => SchemaRef::primitive(SchemaType::String, Some("date-time")),
            ScalarType::Date => SchemaRef::primitive(SchemaType::String, Some("date")),
        }
    }

    /// Returns the component name for `info`, building the node on first use.
    fn component(&mut self, info: &TypeInfo) -> DocsResult<String> {
        if let Some(name) = self.names.get(&info.type_id) {
            return Ok(name.clone());
        }

        let name = self.conventions.type_names().name_for(info);
        if let Some(owner) = self.owners.get(&name) {
            return Err(DocsError::SchemaNameCollision {
                name,
                first: owner.clone(),
                second: info.qualified_name(),
            });
        }
        // Reserve before walking so recursive fields resolve to the name.
        self.names.insert(info.type_id, name.clone());
        self.owners.insert(name.clone(), info.qualified_name());

        let documentation = self.conventions.documentation();
        let description = documentation.model(&info.metadata);
        let kind = match &info.kind {
            TypeKind::Object(fields) => {
                let mut schemas = Vec::with_capacity(fields.len());
                for field in fields {
                    schemas.push(FieldSchema {
                        name: field.name.clone(),
                        documentation: documentation.model(&field.metadata),
                        schema: self.schema_ref(field.ty)?,
                        required: field.is_required(),
                    });
                }
                NodeKind::Object { fields: schemas }
            }
            TypeKind::Enum(values) => {
                let format = self.conventions.serializer().options().enum_format;
                NodeKind::Enum {
                    values: values.iter().map(|v| format.apply(v)).collect(),
                }
            }
            TypeKind::Polymorphic(table) => {
                let mut mapping = IndexMap::new();
                let mut variants = Vec::with_capacity(table.variants.len());
                for variant in &table.variants {
                    let schema = self.schema_ref(variant.ty)?;
                    let SchemaRef::Component(target) = &schema else {
                        return Err(DocsError::UnnamedVariant {
                            component: name,
                            tag: variant.tag.clone(),
                        });
                    };
                    mapping.insert(variant.tag.clone(), format!("{COMPONENT_PREFIX}{target}"));
                    variants.push(schema);
                }
                NodeKind::Polymorphic {
                    discriminator: Discriminator {
                        property_name: table.property.clone(),
                        mapping,
                    },
                    variants,
                }
            }
            _ => NodeKind::Object { fields: Vec::new() },
        };

        tracing::trace!(component = %name, "resolved schema component");
        self.nodes.insert(
            name.clone(),
            Arc::new(TypeSchemaNode {
                name: name.clone(),
                description,
                kind,
            }),
        );
        Ok(name)
    }
}
