//! Structural tests over the generated OpenAPI document.
//!
//! These pin the REST contract surface so route or schema renames show up
//! as test failures instead of silent client breakage.

use oireachtas_bills_api::rest::ApiDoc;
use utoipa::OpenApi;

fn openapi_json() -> serde_json::Value {
    serde_json::to_value(ApiDoc::openapi()).expect("openapi document serializes")
}

#[test]
fn documents_all_rest_paths() {
    let doc = openapi_json();
    let paths = doc["paths"].as_object().expect("paths object");

    for path in ["/bills", "/favorites", "/favorites/toggle", "/favorites/{id}"] {
        assert!(paths.contains_key(path), "missing path {path}");
    }
}

#[test]
fn serves_under_api_v1() {
    let doc = openapi_json();
    assert_eq!(doc["servers"][0]["url"], "/api/v1");
}

#[test]
fn exposes_core_schemas() {
    let doc = openapi_json();
    let schemas = doc["components"]["schemas"]
        .as_object()
        .expect("schemas object");

    for schema in ["Bill", "ProblemDetails", "QuerySnapshot", "FeedInput"] {
        assert!(schemas.contains_key(schema), "missing schema {schema}");
    }
}

#[test]
fn bill_schema_keeps_wire_field_names() {
    let doc = openapi_json();
    let properties = doc["components"]["schemas"]["Bill"]["properties"]
        .as_object()
        .expect("bill properties");

    assert!(properties.contains_key("billNo"));
    assert!(properties.contains_key("billStatus"));
    // Title fields stay snake_case on the wire.
    assert!(properties.contains_key("title_en"));
    assert!(properties.contains_key("title_ga"));
    assert!(!properties.contains_key("titleEn"));
}

#[test]
fn bills_listing_documents_query_parameters() {
    let doc = openapi_json();
    let parameters = doc["paths"]["/bills"]["get"]["parameters"]
        .as_array()
        .expect("parameters array");

    let names: Vec<&str> = parameters
        .iter()
        .filter_map(|param| param["name"].as_str())
        .collect();
    assert!(names.contains(&"page"));
    assert!(names.contains(&"pageSize"));
    assert!(names.contains(&"q"));
}
