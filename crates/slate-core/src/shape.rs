//! Precomputed value shapes.
//!
//! Walking [`TypeInfo`] allocates and calls through function pointers. The
//! registry therefore interns every parameter and return type into a
//! [`ShapeTable`] once, at build time. Per-request code only follows
//! [`ShapeId`] indices. Recursive types are represented by back references.

use std::any::TypeId;
use std::collections::HashMap;

use crate::reflect::{ScalarType, TypeKind, TypeRef};

/// Index of a [`Shape`] within a [`ShapeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(usize);

/// Structural description of a value, with nested types as [`ShapeId`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `()`
    Unit,
    /// Arbitrary JSON
    Any,
    /// A scalar
    Scalar(ScalarType),
    /// Nullable value
    Optional(ShapeId),
    /// Ordered collection
    List(ShapeId),
    /// String-keyed map
    Map(ShapeId),
    /// Closed set of strings, by declared wire name
    Enum(Vec<String>),
    /// Record with named fields
    Object {
        /// `(wire name, shape)` pairs in declaration order
        fields: Vec<(String, ShapeId)>,
    },
    /// Tagged union
    Polymorphic {
        /// Discriminator property
        property: String,
        /// `(tag, shape)` pairs
        variants: Vec<(String, ShapeId)>,
    },
}

impl Shape {
    /// Returns true for scalars and enums, which parse from a single string.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }
}

/// Interned shapes for every type seen by the registry.
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    shapes: Vec<Shape>,
    by_type: HashMap<TypeId, ShapeId>,
}

impl ShapeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shape for `ty`, interning it and its dependencies.
    pub fn intern(&mut self, ty: TypeRef) -> ShapeId {
        let info = ty.resolve();
        if let Some(id) = self.by_type.get(&info.type_id) {
            return *id;
        }

        // Reserve the slot first so recursive references find it.
        let id = ShapeId(self.shapes.len());
        self.shapes.push(Shape::Any);
        self.by_type.insert(info.type_id, id);

        let shape = match info.kind {
            TypeKind::Unit => Shape::Unit,
            TypeKind::Any => Shape::Any,
            TypeKind::Scalar(scalar) => Shape::Scalar(scalar),
            TypeKind::Optional(inner) => Shape::Optional(self.intern(inner)),
            TypeKind::List(inner) => Shape::List(self.intern(inner)),
            TypeKind::Map(inner) => Shape::Map(self.intern(inner)),
            TypeKind::Enum(values) => Shape::Enum(values),
            TypeKind::Object(fields) => Shape::Object {
                fields: fields
                    .into_iter()
                    .map(|f| (f.name, self.intern(f.ty)))
                    .collect(),
            },
            TypeKind::Polymorphic(table) => Shape::Polymorphic {
                variants: table
                    .variants
                    .into_iter()
                    .map(|v| (v.tag, self.intern(v.ty)))
                    .collect(),
                property: table.property,
            },
        };
        self.shapes[id.0] = shape;
        id
    }

    /// Returns the shape stored at `id`.
    pub fn get(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }

    /// Returns a view of `id` for walking.
    pub fn view(&self, id: ShapeId) -> ShapeView<'_> {
        ShapeView { table: self, id }
    }

    /// Returns the number of interned shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A shape together with the table that resolves its children.
#[derive(Debug, Clone, Copy)]
pub struct ShapeView<'a> {
    table: &'a ShapeTable,
    id: ShapeId,
}

impl<'a> ShapeView<'a> {
    /// Returns the viewed shape.
    pub fn shape(&self) -> &'a Shape {
        self.table.get(self.id)
    }

    /// Returns a view of a child shape.
    pub fn child(&self, id: ShapeId) -> Self {
        Self {
            table: self.table,
            id,
        }
    }

    /// Returns the view with any `Optional` wrappers removed.
    pub fn unwrap_optional(&self) -> Self {
        match self.shape() {
            Shape::Optional(inner) => self.child(*inner).unwrap_optional(),
            _ => *self,
        }
    }

    /// Returns the id of the viewed shape.
    pub fn id(&self) -> ShapeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ApiModel, FieldInfo, TypeInfo};

    struct Tree;

    impl ApiModel for Tree {
        fn type_info() -> TypeInfo {
            TypeInfo::new::<Self>(
                "Tree",
                TypeKind::Object(vec![
                    FieldInfo::new("name", TypeRef::of::<String>()),
                    FieldInfo::new("children", TypeRef::of::<Vec<Tree>>()),
                ]),
            )
        }
    }

    #[test]
    fn test_intern_is_idempotent() {
        let mut table = ShapeTable::new();
        let a = table.intern(TypeRef::of::<Option<u32>>());
        let b = table.intern(TypeRef::of::<Option<u32>>());
        assert_eq!(a, b);
        assert_eq!(table.len(), 2);
        assert!(table.view(a).unwrap_optional().shape().is_scalar());
    }

    #[test]
    fn test_recursive_type() {
        let mut table = ShapeTable::new();
        let tree = table.intern(TypeRef::of::<Tree>());
        let Shape::Object { fields } = table.get(tree) else {
            panic!("expected object");
        };
        let Shape::List(item) = table.get(fields[1].1) else {
            panic!("expected list");
        };
        assert_eq!(*item, tree);
    }
}
