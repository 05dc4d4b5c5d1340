//! Tests that `#[derive(ApiModel)]` output agrees with serde.

use serde::{Deserialize, Serialize};
use serde_json::json;
use slate_core::{ApiModel, ScalarType, TypeKind, TypeRef};
use slate_macros::ApiModel;

/// A thing.
#[derive(Debug, Serialize, Deserialize, ApiModel)]
#[serde(rename_all = "camelCase")]
struct Thing {
    /// Identifier.
    thing_id: u64,
    label: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(skip)]
    #[allow(dead_code)]
    cache: u64,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
#[serde(rename_all = "UPPERCASE")]
enum Color {
    Red,
    Green,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct SubClass1 {
    radius: f64,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct SubClass2 {
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
#[serde(tag = "className")]
enum SuperClass {
    SubClass1(SubClass1),
    SubClass2(SubClass2),
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct ThingId(u64);

#[derive(Debug, Serialize, Deserialize, ApiModel)]
#[annotate(Documentation, value = "Tree node", owner = "core")]
struct Node {
    children: Vec<Node>,
}

fn fields(kind: TypeKind) -> Vec<slate_core::FieldInfo> {
    match kind {
        TypeKind::Object(fields) => fields,
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_object_field_names_match_serde() {
    let info = Thing::type_info();
    assert_eq!(info.name, "Thing");
    assert_eq!(info.module_path, module_path!());
    assert_eq!(info.metadata.doc_comment(), Some("A thing."));

    let fields = fields(info.kind);
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["thingId", "label", "tags"]);

    let value = serde_json::to_value(Thing {
        thing_id: 1,
        label: None,
        tags: vec![],
        cache: 9,
    })
    .unwrap();
    let mut wire: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    wire.sort();
    let mut reflected: Vec<_> = names.iter().map(ToString::to_string).collect();
    reflected.sort();
    assert_eq!(wire, reflected);

    assert!(fields[0].is_required());
    assert!(!fields[1].is_required());
    assert!(!fields[2].is_required());
    assert_eq!(fields[0].metadata.doc_comment(), Some("Identifier."));
}

#[test]
fn test_unit_enum_values_match_serde() {
    assert_eq!(
        Color::type_info().kind,
        TypeKind::Enum(vec!["RED".to_string(), "GREEN".to_string()])
    );
    assert_eq!(serde_json::to_value(Color::Green).unwrap(), json!("GREEN"));
}

#[test]
fn test_tagged_enum_is_polymorphic() {
    let TypeKind::Polymorphic(table) = SuperClass::type_info().kind else {
        panic!("expected polymorphic");
    };
    assert_eq!(table.property, "className");
    let tags: Vec<_> = table.variants.iter().map(|v| v.tag.as_str()).collect();
    assert_eq!(tags, vec!["SubClass1", "SubClass2"]);
    assert_eq!(table.variants[1].ty, TypeRef::of::<SubClass2>());

    let value = serde_json::to_value(SuperClass::SubClass1(SubClass1 { radius: 1.0 })).unwrap();
    assert_eq!(value["className"], json!(table.variants[0].tag));
}

#[test]
fn test_generic_struct() {
    let info = Page::<Thing>::type_info();
    assert_eq!(info.name, "Page");
    assert_eq!(info.generics, vec![TypeRef::of::<Thing>()]);
    assert_ne!(info.type_id, Page::<Color>::type_info().type_id);
}

#[test]
fn test_newtype_is_transparent() {
    assert_eq!(
        ThingId::type_info().kind,
        TypeKind::Scalar(ScalarType::Int64)
    );
}

#[test]
fn test_annotations_and_recursion() {
    let info = Node::type_info();
    let annotation = info.metadata.find("Documentation").unwrap();
    assert_eq!(annotation.value(), Some("Tree node"));
    assert_eq!(annotation.get("owner"), Some("core"));

    let fields = fields(info.kind);
    let TypeKind::List(inner) = fields[0].ty.resolve().kind else {
        panic!("expected list");
    };
    assert_eq!(inner.resolve().name, "Node");
}
