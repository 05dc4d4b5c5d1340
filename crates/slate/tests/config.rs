//! Building a `Slate` from a configuration file.

use std::fs;

use bytes::Bytes;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use slate::prelude::*;

struct Catalog;

#[web_service]
impl Catalog {
    pub fn find_items(&self, limit: Option<u32>) -> Vec<u32> {
        (0..limit.unwrap_or(3)).collect()
    }

    pub fn delete_item(&self, #[api(path)] id: u32) {
        let _ = id;
    }
}

const CONFIG: &str = r#"
[verbs]
get = "(get|find).*"
delete = ""

[naming]
path_case = "snake"
tags = "first_segment"

[docs]
title = "Catalog"
version = "3.1.4"
servers = [{ url = "https://catalog.example.com", description = "production" }]
"#;

fn load() -> SlateConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slate.toml");
    fs::write(&path, CONFIG).unwrap();
    ConfigLoader::new().with_file(&path).unwrap().load().unwrap()
}

#[test]
fn test_config_drives_conventions() {
    let slate = SlateBuilder::from_config(load())
        .register("/catalog", || Catalog)
        .build()
        .unwrap();

    let find = slate.description().operation("Catalog.find_items").unwrap();
    assert_eq!(find.verb, HttpVerb::Get);
    assert_eq!(find.path, "/catalog/items");
    assert_eq!(find.tag.as_deref(), Some("catalog"));

    // DELETE is disabled, so delete_item falls back to POST and keeps its name.
    let delete = slate.description().operation("Catalog.delete_item").unwrap();
    assert_eq!(delete.verb, HttpVerb::Post);
    assert_eq!(delete.path, "/catalog/delete_item/{id}");

    let response = slate.handle(
        Request::get("/catalog/items?limit=2")
            .body(Bytes::new())
            .unwrap(),
    );
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        serde_json::from_slice::<Value>(response.body()).unwrap(),
        json!([0, 1])
    );
}

#[test]
fn test_docs_section_reaches_the_document() {
    let slate = SlateBuilder::from_config(load())
        .register("/catalog", || Catalog)
        .build()
        .unwrap();
    let spec = slate.openapi().unwrap();

    assert_eq!(spec.info.title, "Catalog");
    assert_eq!(spec.info.version, "3.1.4");
    assert_eq!(spec.servers[0].url, "https://catalog.example.com");
    assert_eq!(spec.servers[0].description.as_deref(), Some("production"));
    assert_eq!(spec.tags[0].name, "catalog");
}

#[test]
fn test_invalid_pattern_is_a_build_error() {
    let mut config = SlateConfig::default();
    config.verbs.get = "(get".to_string();

    let err = SlateBuilder::from_config(config).build().unwrap_err();
    assert!(matches!(err, SlateError::Config(_)));
}
