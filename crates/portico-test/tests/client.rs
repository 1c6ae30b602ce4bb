//! The test client against a real service.

use http::StatusCode;
use portico_core::Error;
use portico_macros::Describe;
use portico_schema::FormFile;
use portico_server::{Context, Handler, Service};
use portico_test::{Multipart, TestClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Login {
    #[param(form = "user", json = "-", min_length = 3)]
    user: String,
    #[param(form = "pass", json = "-", min_length = 1)]
    pass: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct LoggedIn {
    #[param(cookie = "session,Path=/,HttpOnly", json = "-")]
    session: String,
    user: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Me {
    #[param(cookie = "session", json = "-", min_length = 1)]
    session: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Profile {
    session: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Upload {
    #[param(formData = "title", json = "-", min_length = 1)]
    title: String,
    #[param(formData = "file", json = "-")]
    file: FormFile,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Uploaded {
    title: String,
    filename: String,
    size: usize,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Search {
    #[param(query = "tag", json = "-", max_length = 3)]
    tags: Vec<String>,
    #[param(query = "page", json = "-", default = 1, minimum = 1)]
    page: u32,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Results {
    tags: Vec<String>,
    page: u32,
}

fn client() -> TestClient {
    let mut service = Service::new("/api");
    service.post(
        "/login",
        Handler::new(|_ctx: Context, input: Login| async move {
            Ok::<_, Error>(LoggedIn {
                session: format!("s-{}", input.user),
                user: input.user,
            })
        }),
    );
    service.get(
        "/me",
        Handler::new(|_ctx: Context, input: Me| async move {
            Ok::<_, Error>(Profile {
                session: input.session,
            })
        }),
    );
    service.post(
        "/upload",
        Handler::new(|_ctx: Context, input: Upload| async move {
            Ok::<_, Error>(Uploaded {
                title: input.title,
                filename: input.file.filename().unwrap_or_default().to_string(),
                size: input.file.len(),
            })
        }),
    );
    service.get(
        "/search",
        Handler::new(|_ctx: Context, input: Search| async move {
            Ok::<_, Error>(Results {
                tags: input.tags,
                page: input.page,
            })
        }),
    );
    service.docs("/docs", Map::new());
    TestClient::from_service(service)
}

#[tokio::test]
async fn test_form_login_sets_cookie() {
    let response = client()
        .post("/api/login")
        .form(&[("user", "alice"), ("pass", "secret")])
        .send()
        .await;

    response
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"user": "alice"}));
    assert_eq!(
        response.set_cookie("session"),
        Some("session=s-alice;Path=/;HttpOnly")
    );
}

#[tokio::test]
async fn test_form_validation() {
    client()
        .post("/api/login")
        .form(&[("user", "al"), ("pass", "x")])
        .send()
        .await
        .assert_validation_error("form:user");
}

#[tokio::test]
async fn test_cookie_input() {
    client()
        .get("/api/me")
        .cookie("session", "s-alice")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_field("session", &json!("s-alice"));
}

#[tokio::test]
async fn test_missing_cookie_fails_validation() {
    client()
        .get("/api/me")
        .send()
        .await
        .assert_validation_error("cookie:session");
}

#[tokio::test]
async fn test_multipart_upload() {
    let form = Multipart::new()
        .text("title", "Notes")
        .file("file", "notes.txt", "text/plain", "hello world");

    client()
        .post("/api/upload")
        .multipart(form)
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"title": "Notes", "filename": "notes.txt", "size": 11}));
}

#[tokio::test]
async fn test_repeated_query_parameters() {
    client()
        .get("/api/search")
        .query(&[("tag", "a"), ("tag", "b")])
        .send()
        .await
        .assert_json_eq(&json!({"tags": ["a", "b"], "page": 1}));
}

#[tokio::test]
async fn test_query_limits() {
    client()
        .get("/api/search")
        .query(&[("tag", "a"), ("tag", "b"), ("tag", "c"), ("tag", "d")])
        .send()
        .await
        .assert_validation_error("query:tag");
}

#[tokio::test]
async fn test_head_request() {
    client()
        .head("/api/search")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_empty_body();
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let client = client().with_default_header("Cookie", "session=from-default");
    client
        .get("/api/me")
        .send()
        .await
        .assert_json_field("session", &json!("from-default"));
}

#[tokio::test]
async fn test_openapi_document() {
    let doc = client().openapi("/api/docs/openapi.json").await;
    assert!(doc["paths"]["/upload"]["post"]["requestBody"]["content"]["multipart/form-data"]
        .is_object());
    assert_eq!(
        doc["paths"]["/search"]["get"]["parameters"][0]["name"],
        json!("tag")
    );
}
