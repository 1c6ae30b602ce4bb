//! Test client for in-memory HTTP testing.

use bytes::Bytes;
use http::Method;
use portico_server::{App, Service};
use serde::Serialize;

use crate::error::TestError;
use crate::multipart::Multipart;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// A client that sends requests straight into an [`App`].
///
/// Requests take the same path as over the network: body limit, routing,
/// guards, binding, validation and error classification. No socket is
/// opened.
///
/// # Example
///
/// ```ignore
/// use portico_test::TestClient;
///
/// let client = TestClient::from_service(service);
///
/// let response = client.get("/api/hello/world").query_param("locale", "zh-CN").send().await;
/// response.assert_status(StatusCode::OK).assert_header("x-locale", "zh-CN");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    app: App,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for a built app.
    pub fn new(app: App) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Builds `service` and creates a client for it.
    pub fn from_service(service: Service) -> Self {
        Self::new(service.build())
    }

    /// The app under test.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::head(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Fetches the served OpenAPI document from `path`.
    ///
    /// # Panics
    ///
    /// Panics if the document is not served there.
    pub async fn openapi(&self, path: impl AsRef<str>) -> serde_json::Value {
        self.get(path)
            .send()
            .await
            .assert_status(http::StatusCode::OK)
            .json_value()
            .expect("OpenAPI document should be JSON")
    }

    /// Sends a built request.
    pub async fn send(&self, request: TestRequest) -> TestResponse {
        let response = self.app.handle(request.into_http_request()).await;
        TestResponse::from_http(response)
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    fn map(mut self, f: impl FnOnce(TestRequestBuilder) -> TestRequestBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    /// Appends a header.
    pub fn header(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.map(|b| b.header(name, value))
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.map(|b| b.content_type(content_type))
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.map(|b| b.bearer_token(token))
    }

    /// Adds a cookie.
    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|b| b.cookie(name, value))
    }

    /// Appends one query parameter.
    pub fn query_param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|b| b.query_param(name, value))
    }

    /// Appends query parameters.
    pub fn query<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.map(|b| b.query(value))
    }

    /// Sets the raw request body.
    pub fn body(self, body: impl Into<Bytes>) -> Self {
        self.map(|b| b.body(body))
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.map(|b| b.json(value))
    }

    /// Sets the request body as form-urlencoded.
    pub fn form<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.map(|b| b.form(value))
    }

    /// Sets the request body as `multipart/form-data`.
    pub fn multipart(self, form: Multipart) -> Self {
        self.map(|b| b.multipart(form))
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should build")
    }

    /// Sends the request, reporting build failures.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(self.client.send(request).await)
    }
}
