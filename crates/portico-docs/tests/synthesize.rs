//! Documents synthesized from derived shapes.

use http::Method;
use portico_docs::{synthesize, OpenApi, ParameterIn};
use portico_macros::Describe;
use portico_schema::{Describe as _, TypeInfo};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize, Describe)]
struct Paging {
    #[param(query = "page", default = 1, minimum = 1)]
    page: u32,
}

/// Updates a user profile.
#[derive(Serialize, Deserialize, Describe)]
#[param(title = "Update user")]
struct UpdateUser {
    #[param(path = "id", json = "-")]
    id: u64,
    #[param(json = "email", format = "email", required)]
    email: Option<String>,
    #[param(json = "nickname", min_length = 2, max_length = 20)]
    nickname: String,
    #[param(cookie = "session", json = "-")]
    session: String,
    #[serde(flatten)]
    paging: Paging,
}

#[derive(Serialize, Deserialize, Describe)]
struct User {
    id: u64,
    #[param(json = "email")]
    email: String,
    #[param(header = "ETag", json = "-")]
    etag: String,
}

fn document() -> OpenApi {
    let mut doc = OpenApi::new("Users", "1.0.0");
    doc.add_operation(
        &Method::PUT,
        "/users/{id}",
        synthesize(&UpdateUser::describe(), &User::type_info()),
    )
    .unwrap();
    doc
}

#[test]
fn test_parameters_follow_location_tags() {
    let doc = document();
    let op = doc.operation(&Method::PUT, "/users/{id}").unwrap();
    let params: Vec<_> = op
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location, p.required))
        .collect();
    assert_eq!(
        params,
        [
            ("id", ParameterIn::Path, true),
            ("page", ParameterIn::Query, false),
            ("session", ParameterIn::Cookie, false),
        ]
    );
}

#[test]
fn test_json_body_schema() {
    let doc = document();
    let value = serde_json::to_value(&doc).unwrap();
    let body = &value["paths"]["/users/{id}"]["put"]["requestBody"];
    assert_eq!(
        body,
        &json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": {
                        "type": "object",
                        "title": "Update user",
                        "description": "Updates a user profile.",
                        "properties": {
                            "email": {"type": "string", "format": "email", "nullable": true},
                            "nickname": {"type": "string", "minLength": 2, "maxLength": 20}
                        },
                        "required": ["email"]
                    }
                }
            }
        })
    );
}

#[test]
fn test_response_schema_and_headers() {
    let doc = document();
    let value = serde_json::to_value(&doc).unwrap();
    let ok = &value["paths"]["/users/{id}"]["put"]["responses"]["200"];
    assert_eq!(ok["description"], "OK");
    assert_eq!(
        ok["content"]["application/json"]["schema"]["properties"],
        json!({
            "id": {"type": "integer", "format": "int64"},
            "email": {"type": "string"}
        })
    );
    assert_eq!(ok["headers"]["ETag"]["schema"], json!({"type": "string"}));
}

#[test]
fn test_document_serializes() {
    let json = document().to_json_pretty().unwrap();
    assert!(json.contains("\"openapi\": \"3.0.3\""));
    assert!(json.contains("/users/{id}"));
}
