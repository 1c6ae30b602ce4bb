//! A service built only from the facade, exercised through the test client.

use portico::prelude::*;
use portico::schema::Empty;
use portico_test::TestClient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct Register {
    #[param(json = "username", min_length = 3)]
    username: String,
    #[param(json = "email", format = "email")]
    email: Option<String>,
    #[param(header = "X-Client", json = "-", default = "web")]
    client: String,
    #[param(query = "invite", json = "-", max_length = 8)]
    invite: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct Registered {
    #[param(header = "Location", json = "-")]
    location: String,
    #[param(cookie = "sid,Path=/,HttpOnly", json = "-")]
    session: String,
    username: String,
    client: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct Lookup {
    #[param(path = "id", json = "-", minimum = 1)]
    id: u64,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct Token {
    token: String,
}

fn client() -> TestClient {
    let mut service = Service::new("/v1");
    service.info("Accounts", "2.1.0");
    service.with_http_bearer_security("bearerAuth");
    service.with_http_basic_security("basicAuth");

    service.post(
        "/register",
        Handler::new(|_ctx: Context, input: Register| async move {
            Ok::<_, Error>(Registered {
                location: format!("/v1/users/{}", input.username),
                session: format!("sid-{}", input.username),
                username: input.username,
                client: input.client,
            })
        })
        .summary("Register")
        .tags(["Accounts"]),
    );
    service.get(
        "/users/:id",
        Handler::new(|_ctx: Context, input: Lookup| async move {
            if input.id == 404 {
                return Err(Error::from(HttpError::not_found()));
            }
            Ok::<_, Error>(User {
                id: input.id,
                name: format!("user-{}", input.id),
            })
        }),
    );
    service.delete(
        "/users/:id",
        Handler::new(|_ctx: Context, _input: Lookup| async move {
            Err::<Empty, _>(Error::msg("storage offline"))
        }),
    );

    service
        .group("/me")
        .tags(["Accounts"])
        .security("bearerAuth")
        .guard(BearerAuth::new(|token: &str| {
            if token == "t0ken" {
                Ok(Token {
                    token: token.to_string(),
                })
            } else {
                Err(HttpError::with_message(StatusCode::UNAUTHORIZED, "bad token").into())
            }
        }))
        .get(
            "/token",
            Handler::new(|ctx: Context, _input: Empty| async move {
                let token = ctx
                    .get::<Token>()
                    .map(|t| t.token.clone())
                    .unwrap_or_default();
                Ok::<_, Error>(Token { token })
            }),
        );

    service
        .group("/ops")
        .security("basicAuth")
        .guard(BasicAuth::new(|user: &str, password: &str| {
            if password == "hunter2" {
                Ok(Token {
                    token: user.to_string(),
                })
            } else {
                Err(HttpError::with_message(StatusCode::UNAUTHORIZED, "bad credentials").into())
            }
        }))
        .get(
            "/whoami",
            Handler::new(|ctx: Context, _input: Empty| async move {
                let user = ctx.get::<Token>().map(|t| t.token.clone()).unwrap_or_default();
                Ok::<_, Error>(Token { token: user })
            }),
        );

    service.docs("/docs", Map::new());
    TestClient::from_service(service)
}

#[tokio::test]
async fn test_short_username_is_a_validation_error() {
    let response = client()
        .post("/v1/register")
        .json(&json!({"username": "ab"}))
        .send()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST).assert_json_eq(&json!({
        "error": "Validation Error",
        "context": {"json:username": "\"ab\" is shorter than 3 characters"}
    }));
}

#[tokio::test]
async fn test_register_writes_output_header_and_cookie() {
    let response = client()
        .post("/v1/register")
        .json(&json!({"username": "alice", "email": "alice@example.com"}))
        .send()
        .await;

    response
        .assert_status(StatusCode::OK)
        .assert_header("Location", "/v1/users/alice")
        .assert_json_eq(&json!({"username": "alice", "client": "web"}));
    assert_eq!(
        response.set_cookie("sid"),
        Some("sid=sid-alice;Path=/;HttpOnly")
    );
}

#[tokio::test]
async fn test_request_header_overrides_default() {
    client()
        .post("/v1/register")
        .header("X-Client", "cli")
        .json(&json!({"username": "alice"}))
        .send()
        .await
        .assert_json_field("client", &json!("cli"));
}

#[tokio::test]
async fn test_query_failure_reported_before_json() {
    client()
        .post("/v1/register")
        .query_param("invite", "much-too-long")
        .json(&json!({"username": "ab"}))
        .send()
        .await
        .assert_validation_error("query:invite");
}

#[tokio::test]
async fn test_bad_email_format() {
    client()
        .post("/v1/register")
        .json(&json!({"username": "alice", "email": "nope"}))
        .send()
        .await
        .assert_validation_error("json:email");
}

#[tokio::test]
async fn test_path_parameter_is_coerced() {
    client()
        .get("/v1/users/42")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"id": 42, "name": "user-42"}));
}

#[tokio::test]
async fn test_unparsable_path_parameter_is_bad_request() {
    client()
        .get("/v1/users/abc")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_path_minimum() {
    client()
        .get("/v1/users/0")
        .send()
        .await
        .assert_validation_error("path:id");
}

#[tokio::test]
async fn test_handler_not_found_has_empty_body_text() {
    let response = client().get("/v1/users/404").send().await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.error().unwrap();
    assert!(body.error_text.is_empty());
    assert!(body.context.is_none());
}

#[tokio::test]
async fn test_plain_error_is_internal() {
    let response = client().delete("/v1/users/7").send().await;
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_eq(&json!({"error": "storage offline"}));
}

#[tokio::test]
async fn test_head_error_has_no_body() {
    client()
        .head("/v1/users/abc")
        .send()
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_empty_body();
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let client = client();
    client
        .get("/v1/nowhere")
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
    client
        .get("/v1/register")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_header("Allow", "POST");
}

#[tokio::test]
async fn test_guarded_group() {
    let client = client();
    client
        .get("/v1/me/token")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    client
        .get("/v1/me/token")
        .bearer_token("wrong")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_json_field("error", &json!("bad token"));
    client
        .get("/v1/me/token")
        .bearer_token("t0ken")
        .send()
        .await
        .assert_json_eq(&json!({"token": "t0ken"}));
}

#[tokio::test]
async fn test_basic_auth_group() {
    let client = client();
    client
        .get("/v1/ops/whoami")
        .header("Authorization", "Basic b3BzOmh1bnRlcjI=")
        .send()
        .await
        .assert_json_eq(&json!({"token": "ops"}));
    client
        .get("/v1/ops/whoami")
        .header("Authorization", "Basic b3BzOm5vcGU=")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_json_field("error", &json!("bad credentials"));
}

#[tokio::test]
async fn test_document_lists_every_location() {
    let doc = client().openapi("/v1/docs/openapi.json").await;

    assert_eq!(doc["info"]["title"], "Accounts");
    assert_eq!(doc["info"]["version"], "2.1.0");

    let register = &doc["paths"]["/register"]["post"];
    assert_eq!(register["summary"], "Register");
    let params: Vec<(&str, &str)> = register["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["in"].as_str().unwrap(), p["name"].as_str().unwrap()))
        .collect();
    assert!(params.contains(&("header", "X-Client")));
    assert!(params.contains(&("query", "invite")));

    let body = &register["requestBody"]["content"]["application/json"]["schema"];
    assert_eq!(body["properties"]["username"]["minLength"], 3);
    assert_eq!(body["properties"]["email"]["format"], "email");

    let headers = &register["responses"]["200"]["headers"];
    assert!(headers.get("Location").is_some());

    let lookup = &doc["paths"]["/users/{id}"]["get"]["parameters"][0];
    assert_eq!(lookup["in"], "path");
    assert_eq!(lookup["required"], true);
    assert_eq!(lookup["schema"]["minimum"], 1.0);

    let token = &doc["paths"]["/me/token"]["get"];
    assert_eq!(token["security"], json!([{"bearerAuth": []}]));
    assert!(token["responses"].get("401").is_some());
    assert_eq!(
        doc["components"]["securitySchemes"]["bearerAuth"]["scheme"],
        "bearer"
    );
    assert_eq!(
        doc["components"]["securitySchemes"]["basicAuth"]["scheme"],
        "basic"
    );
    assert_eq!(
        doc["paths"]["/ops/whoami"]["get"]["security"],
        json!([{"basicAuth": []}])
    );
}

fn catalog() -> TestClient {
    let mut service = Service::default();
    service.with_tags(["Catalog", "Internal"]);
    service.with_api_key_security("apiKey", "X-Api-Key", ApiKeyLocation::Header);

    {
        let mut shop = service.group("/shop").tags(["Catalog"]);
        shop.get(
            "/items/:id",
            Handler::new(|_ctx: Context, input: Lookup| async move {
                Ok::<_, Error>(User {
                    id: input.id,
                    name: format!("item-{}", input.id),
                })
            })
            .operation_id("getItem"),
        );
        shop.sub_group("/admin")
            .security("apiKey")
            .guard(|ctx: &mut Context| -> Result<(), Error> {
                match ctx.header("x-api-key") {
                    Some("k3y") => Ok(()),
                    _ => Err(HttpError::new(StatusCode::FORBIDDEN).into()),
                }
            })
            .delete(
                "/items/:id",
                Handler::new(|_ctx: Context, _input: Lookup| async move {
                    Ok::<_, Error>(Empty::default())
                })
                .deprecated(),
            );
    }

    service.docs("/docs", Map::new());
    TestClient::from_service(service)
}

#[tokio::test]
async fn test_group_routes() {
    let client = catalog();
    client
        .get("/shop/items/5")
        .send()
        .await
        .assert_json_eq(&json!({"id": 5, "name": "item-5"}));
    client
        .delete("/shop/admin/items/5")
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN);
    client
        .delete("/shop/admin/items/5")
        .header("X-Api-Key", "k3y")
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({}));
}

#[tokio::test]
async fn test_sub_group_inherits_options() {
    let doc = catalog().openapi("/docs/openapi.json").await;

    let names: Vec<&str> = doc["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Catalog", "Internal"]);

    let get = &doc["paths"]["/shop/items/{id}"]["get"];
    assert_eq!(get["operationId"], "getItem");
    assert_eq!(get["tags"], json!(["Catalog"]));
    assert!(get.get("security").is_none());

    let delete = &doc["paths"]["/shop/admin/items/{id}"]["delete"];
    assert_eq!(delete["deprecated"], true);
    assert_eq!(delete["tags"], json!(["Catalog"]));
    assert_eq!(delete["security"], json!([{"apiKey": []}]));

    assert_eq!(
        doc["components"]["securitySchemes"]["apiKey"],
        json!({"type": "apiKey", "in": "header", "name": "X-Api-Key"})
    );
}
