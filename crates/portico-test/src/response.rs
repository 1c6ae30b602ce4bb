//! Responses captured by the test client.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use portico_core::ErrResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A response from an in-process app, with assertion helpers that chain.
///
/// ```ignore
/// client
///     .post("/v1/register")
///     .json(&json!({"username": "ab"}))
///     .send()
///     .await
///     .assert_validation_error("json:username");
/// ```
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Wraps a response produced by an app.
    pub fn from_http(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// The `Set-Cookie` value for cookie `name`, attributes included.
    #[must_use]
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|cookie| {
                cookie
                    .split_once('=')
                    .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
            })
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Deserializes the body as an error response.
    pub fn error(&self) -> Result<ErrResponse, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics on a different status, printing the body.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that header `name` is present with value `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected, "header '{name}'");
        self
    }

    /// Asserts an empty body.
    ///
    /// # Panics
    ///
    /// Panics if the body has any bytes.
    pub fn assert_empty_body(&self) -> &Self {
        assert!(
            self.body.is_empty(),
            "expected empty body, got {} bytes",
            self.body.len()
        );
        self
    }

    /// Asserts that the JSON body equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or differs.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual: Value = self.json().expect("body should be JSON");
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts one JSON member. Paths are dot separated; numeric segments
    /// index arrays.
    ///
    /// # Panics
    ///
    /// Panics if the member is missing or differs.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &Value) -> &Self {
        let path = path.as_ref();
        let json: Value = self.json().expect("body should be JSON");
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in: {json}"));
        assert_eq!(actual, expected, "JSON field '{path}'");
        self
    }

    /// Asserts a validation failure reported for `key`, such as
    /// `json:username` or `query:page`.
    ///
    /// # Panics
    ///
    /// Panics if the response is not a `400` naming `key` in its context.
    pub fn assert_validation_error(&self, key: &str) -> &Self {
        self.assert_status(StatusCode::BAD_REQUEST);
        let error = self.error().expect("body should be an error response");
        let context = error.context.unwrap_or_default();
        assert!(
            context.contains_key(key),
            "expected validation error for '{key}', got {context:?}"
        );
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        })
}
