//! Requests through a built app.

use std::time::Duration;

use bytes::Bytes;
use http::header::{ALLOW, AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use http::{Method, Request, Response, StatusCode};
use portico_core::{Error, HttpError};
use portico_macros::Describe;
use portico_server::{App, BearerAuth, Context, Handler, ServerConfig, Service};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Serialize, Deserialize, Describe)]
struct HelloInput {
    #[param(path = "name", json = "-", min_length = 3)]
    name: String,
    #[param(query = "locale", json = "-", default = "en-US", enum = "en-US,zh-CN")]
    locale: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct HelloOutput {
    #[param(header = "X-Locale", json = "-")]
    locale: String,
    #[param(cookie = "greeted,Path=/,HttpOnly", json = "-")]
    greeted: String,
    message: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct SignUp {
    #[param(json = "username", min_length = 3, required)]
    username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Account {
    username: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Nothing {
    #[param(query = "q", json = "-")]
    q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
struct Whoami {
    user: String,
}

#[derive(Debug, Clone)]
struct User(String);

fn app() -> App {
    let config = ServerConfig::builder()
        .request_timeout(Duration::from_millis(100))
        .max_body_size(64)
        .build();
    let mut service = Service::new("/api").with_server_config(config);
    service.info("Test API", "0.1.0");
    service.with_http_bearer_security("bearerAuth");

    service.get(
        "/hello/:name",
        Handler::new(|_ctx: Context, input: HelloInput| async move {
            Ok::<_, Error>(HelloOutput {
                message: format!("Hello, {}!", input.name),
                greeted: input.name,
                locale: input.locale,
            })
        })
        .summary("Say hello")
        .tags(["Greeting"]),
    );
    service.post(
        "/users",
        Handler::new(|_ctx: Context, input: SignUp| async move {
            Ok::<_, Error>(Account {
                username: input.username.unwrap_or_default(),
            })
        }),
    );
    service.get(
        "/fail",
        Handler::new(|_ctx: Context, _input: Nothing| async move {
            Err::<Account, _>(Error::msg("database unavailable"))
        }),
    );
    service.get(
        "/teapot",
        Handler::new(|_ctx: Context, _input: Nothing| async move {
            Err::<Account, _>(HttpError::with_message(StatusCode::IM_A_TEAPOT, "short and stout").into())
        }),
    );
    service.get(
        "/slow",
        Handler::new(|_ctx: Context, _input: Nothing| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Error>(Account {
                username: "late".into(),
            })
        }),
    );

    service
        .group("/admin")
        .tags(["Admin"])
        .security("bearerAuth")
        .guard(BearerAuth::new(|token: &str| {
            if token == "letmein" {
                Ok(User("root".into()))
            } else {
                Err(HttpError::with_message(StatusCode::UNAUTHORIZED, "invalid token").into())
            }
        }))
        .get(
            "/me",
            Handler::new(|ctx: Context, _input: Nothing| async move {
                let user = ctx.get::<User>().map(|u| u.0.clone()).unwrap_or_default();
                Ok::<_, Error>(Whoami { user })
            }),
        );

    service.docs("/docs", Map::new());
    service.build()
}

fn request(method: Method, uri: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Bytes> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from(body.to_string()))
        .unwrap()
}

fn body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn test_defaults_output_headers_and_cookies() {
    let response = app().handle(request(Method::GET, "/api/hello/world")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-locale"], "en-US");
    assert_eq!(response.headers()[SET_COOKIE], "greeted=world;Path=/;HttpOnly");
    assert_eq!(body(&response), json!({"message": "Hello, world!"}));
}

#[tokio::test]
async fn test_query_value_is_used() {
    let response = app()
        .handle(request(Method::GET, "/api/hello/world?locale=zh-CN"))
        .await;
    assert_eq!(response.headers()["x-locale"], "zh-CN");
}

#[tokio::test]
async fn test_validation_error_body() {
    let response = app()
        .handle(json_request("/api/users", json!({"username": "ab"})))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(&response),
        json!({
            "error": "Validation Error",
            "context": {"json:username": "\"ab\" is shorter than 3 characters"}
        })
    );
}

#[tokio::test]
async fn test_path_failure_reported_first() {
    let response = app()
        .handle(request(Method::GET, "/api/hello/al?locale=fr-FR"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let context = body(&response)["context"].as_object().unwrap().clone();
    assert_eq!(context.keys().collect::<Vec<_>>(), ["path:name"]);
}

#[tokio::test]
async fn test_plain_error_is_internal() {
    let response = app().handle(request(Method::GET, "/api/fail")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&response), json!({"error": "database unavailable"}));
}

#[tokio::test]
async fn test_http_error_status_and_message() {
    let response = app().handle(request(Method::GET, "/api/teapot")).await;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body(&response), json!({"error": "short and stout"}));
}

#[tokio::test]
async fn test_not_found() {
    let response = app().handle(request(Method::GET, "/api/nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response), json!({}));
}

#[tokio::test]
async fn test_method_not_allowed_lists_methods() {
    let response = app().handle(request(Method::DELETE, "/api/users")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[ALLOW], "POST");
}

#[tokio::test]
async fn test_head_uses_get_route_without_body() {
    let response = app().handle(request(Method::HEAD, "/api/hello/world")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().is_empty());
    assert_eq!(response.headers()["x-locale"], "en-US");
    assert_ne!(response.headers()["content-length"], "0");
}

#[tokio::test]
async fn test_head_error_has_no_body() {
    let response = app().handle(request(Method::HEAD, "/api/hello/al")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_body_over_limit() {
    let long = "x".repeat(100);
    let response = app()
        .handle(json_request("/api/users", json!({"username": long})))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_handler_timeout() {
    let response = app().handle(request(Method::GET, "/api/slow")).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body(&response), json!({"error": "handler timed out"}));
}

#[tokio::test]
async fn test_guard_rejects_missing_token() {
    let response = app().handle(request(Method::GET, "/api/admin/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response), json!({"error": "missing or malformed bearer token"}));
}

#[tokio::test]
async fn test_guard_rejects_bad_token() {
    let mut req = request(Method::GET, "/api/admin/me");
    req.headers_mut()
        .insert(AUTHORIZATION, "Bearer nope".parse().unwrap());
    let response = app().handle(req).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body(&response), json!({"error": "invalid token"}));
}

#[tokio::test]
async fn test_guard_passes_claims_to_handler() {
    let mut req = request(Method::GET, "/api/admin/me");
    req.headers_mut()
        .insert(AUTHORIZATION, "Bearer letmein".parse().unwrap());
    let response = app().handle(req).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response), json!({"user": "root"}));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let response = app()
        .handle(request(Method::GET, "/api/docs/openapi.json"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let doc = body(&response);
    assert_eq!(doc["info"]["title"], "Test API");
    assert_eq!(doc["servers"][0]["url"], "/api");

    let hello = &doc["paths"]["/hello/{name}"]["get"];
    assert_eq!(hello["summary"], "Say hello");
    assert_eq!(hello["tags"], json!(["Greeting"]));

    let me = &doc["paths"]["/admin/me"]["get"];
    assert_eq!(me["tags"], json!(["Admin"]));
    assert_eq!(me["security"], json!([{"bearerAuth": []}]));
    assert_eq!(
        me["responses"]["401"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrResponse"
    );
    assert!(doc["components"]["schemas"]["ErrResponse"].is_object());
    assert_eq!(
        doc["components"]["securitySchemes"]["bearerAuth"],
        json!({"type": "http", "scheme": "bearer"})
    );
}

#[tokio::test]
async fn test_swagger_ui_endpoint() {
    let app = app();
    let response = app.handle(request(Method::GET, "/api/docs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = std::str::from_utf8(response.body()).unwrap();
    assert!(html.contains(r#""url":"/api/docs/openapi.json""#));
    assert!(html.contains("<title>Test API - Swagger UI</title>"));

    let page = app.handle(request(Method::GET, "/api/docs/index.html")).await;
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_routes_are_listed() {
    let routes = app().routes();
    assert!(routes.contains(&(Method::GET, "/api/hello/:name".to_string())));
    assert!(routes.contains(&(Method::GET, "/api/docs/openapi.json".to_string())));
}
