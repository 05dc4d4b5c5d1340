//! Compile-time reflection model.
//!
//! Every type that crosses the API boundary implements [`ApiModel`], which
//! describes its shape as a [`TypeInfo`]. Implementations for user types are
//! generated by `#[derive(ApiModel)]`. Nested types are referenced through
//! [`TypeRef`], a lazy function pointer, so self-referential models do not
//! recurse while being described.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::metadata::Metadata;

/// A type that can be described to the dispatcher and schema generator.
pub trait ApiModel: 'static {
    /// Returns the reflected description of `Self`.
    fn type_info() -> TypeInfo;
}

/// Scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 text.
    String,
    /// `true` or `false`.
    Boolean,
    /// Integer that fits in 32 bits.
    Int32,
    /// Integer that needs up to 64 bits.
    Int64,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Instant in time.
    DateTime,
    /// Calendar date.
    Date,
}

impl ScalarType {
    /// Returns true for the integer types.
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }
}

/// Lazy reference to another type's [`TypeInfo`].
#[derive(Clone, Copy)]
pub struct TypeRef {
    describe: fn() -> TypeInfo,
}

impl TypeRef {
    /// Returns a reference to `T`.
    pub fn of<T: ApiModel>() -> Self {
        Self {
            describe: T::type_info,
        }
    }

    /// Describes the referenced type.
    pub fn resolve(&self) -> TypeInfo {
        (self.describe)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.resolve().type_id == other.resolve().type_id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.resolve().name).finish()
    }
}

/// A named field of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Name on the wire
    pub name: String,
    /// Field type
    pub ty: TypeRef,
    /// True when a missing value deserializes to a default
    pub has_default: bool,
    /// Annotations
    pub metadata: Metadata,
}

impl FieldInfo {
    /// Creates a field.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
            metadata: Metadata::new(),
        }
    }

    /// Marks the field as defaulted when missing.
    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if the field must be present.
    pub fn is_required(&self) -> bool {
        !self.has_default && !self.ty.resolve().kind.is_optional()
    }
}

/// One concrete type in a polymorphic hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Value written to the discriminator property
    pub tag: String,
    /// The concrete type
    pub ty: TypeRef,
}

/// The discriminator table of a polymorphic root.
#[derive(Debug, Clone, PartialEq)]
pub struct Polymorphism {
    /// Name of the property that carries the type tag
    pub property: String,
    /// Concrete types, in declaration order
    pub variants: Vec<Variant>,
}

impl Polymorphism {
    /// Creates an empty table for `property`.
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            variants: Vec::new(),
        }
    }

    /// Adds a concrete type.
    #[must_use]
    pub fn variant(mut self, tag: impl Into<String>, ty: TypeRef) -> Self {
        self.variants.push(Variant {
            tag: tag.into(),
            ty,
        });
        self
    }

    /// Returns the concrete type registered for `tag`.
    pub fn find(&self, tag: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}

/// The structural kind of a reflected type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `()`: no value.
    Unit,
    /// Arbitrary JSON.
    Any,
    /// A scalar.
    Scalar(ScalarType),
    /// A value that may be absent.
    Optional(TypeRef),
    /// An ordered collection.
    List(TypeRef),
    /// A string-keyed map.
    Map(TypeRef),
    /// A closed set of string values, by wire name.
    Enum(Vec<String>),
    /// A record with named fields.
    Object(Vec<FieldInfo>),
    /// A tagged union of object types.
    Polymorphic(Polymorphism),
}

impl TypeKind {
    /// Returns true for [`TypeKind::Optional`].
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns true for kinds that become named schema components.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Enum(_) | Self::Object(_) | Self::Polymorphic(_))
    }
}

/// Reflected description of one Rust type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Base name, without generic arguments
    pub name: String,
    /// Rust module path, empty for built-ins
    pub module_path: &'static str,
    /// Identity of the Rust type
    pub type_id: TypeId,
    /// Generic arguments, in declaration order
    pub generics: Vec<TypeRef>,
    /// Structure
    pub kind: TypeKind,
    /// Annotations
    pub metadata: Metadata,
}

impl TypeInfo {
    /// Creates a description of `T`.
    pub fn new<T: 'static>(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            module_path: "",
            type_id: TypeId::of::<T>(),
            generics: Vec::new(),
            kind,
            metadata: Metadata::new(),
        }
    }

    /// Sets the module path.
    #[must_use]
    pub fn in_module(mut self, module_path: &'static str) -> Self {
        self.module_path = module_path;
        self
    }

    /// Sets the generic arguments.
    #[must_use]
    pub fn with_generics(mut self, generics: Vec<TypeRef>) -> Self {
        self.generics = generics;
        self
    }

    /// Sets the annotations.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns `module::Name`, or just the name for built-ins.
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module_path, self.name)
        }
    }
}

macro_rules! scalar_models {
    ($($ty:ty => $name:literal, $scalar:ident;)*) => {$(
        impl ApiModel for $ty {
            fn type_info() -> TypeInfo {
                TypeInfo::new::<Self>($name, TypeKind::Scalar(ScalarType::$scalar))
            }
        }
    )*};
}

scalar_models! {
    String => "string", String;
    char => "char", String;
    bool => "boolean", Boolean;
    i8 => "int8", Int32;
    i16 => "int16", Int32;
    i32 => "int32", Int32;
    u8 => "uint8", Int32;
    u16 => "uint16", Int32;
    i64 => "int64", Int64;
    u32 => "uint32", Int64;
    u64 => "uint64", Int64;
    isize => "isize", Int64;
    usize => "usize", Int64;
    f32 => "float", Float;
    f64 => "double", Double;
    chrono::NaiveDate => "date", Date;
    chrono::NaiveDateTime => "datetime", DateTime;
}

impl<Tz: chrono::TimeZone + 'static> ApiModel for chrono::DateTime<Tz> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("datetime", TypeKind::Scalar(ScalarType::DateTime))
    }
}

impl ApiModel for () {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("unit", TypeKind::Unit)
    }
}

impl ApiModel for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("any", TypeKind::Any)
    }
}

impl<T: ApiModel> ApiModel for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("Option", TypeKind::Optional(TypeRef::of::<T>()))
            .with_generics(vec![TypeRef::of::<T>()])
    }
}

impl<T: ApiModel> ApiModel for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl<T: ApiModel> ApiModel for Arc<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

macro_rules! list_models {
    ($($ty:ident),*) => {$(
        impl<T: ApiModel> ApiModel for $ty<T> {
            fn type_info() -> TypeInfo {
                TypeInfo::new::<Self>(stringify!($ty), TypeKind::List(TypeRef::of::<T>()))
                    .with_generics(vec![TypeRef::of::<T>()])
            }
        }
    )*};
}

list_models!(Vec, BTreeSet);

impl<T: ApiModel, S: 'static> ApiModel for HashSet<T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("HashSet", TypeKind::List(TypeRef::of::<T>()))
            .with_generics(vec![TypeRef::of::<T>()])
    }
}

impl<V: ApiModel, S: 'static> ApiModel for HashMap<String, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("HashMap", TypeKind::Map(TypeRef::of::<V>()))
            .with_generics(vec![TypeRef::of::<V>()])
    }
}

impl<V: ApiModel> ApiModel for BTreeMap<String, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("BTreeMap", TypeKind::Map(TypeRef::of::<V>()))
            .with_generics(vec![TypeRef::of::<V>()])
    }
}

impl<V: ApiModel, S: 'static> ApiModel for IndexMap<String, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>("IndexMap", TypeKind::Map(TypeRef::of::<V>()))
            .with_generics(vec![TypeRef::of::<V>()])
    }
}
