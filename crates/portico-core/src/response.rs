//! Error classification and the JSON error body.

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{chain, ApiError, Error, Fields};

/// JSON body written for every failed request.
///
/// ```json
/// {"error": "Validation Error", "context": {"json:username": "..."}}
/// ```
///
/// Every member is omitted when empty. The resolved HTTP status and the
/// original error travel alongside but are not serialized.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrResponse {
    /// Status text.
    #[serde(rename = "status", default, skip_serializing_if = "String::is_empty")]
    pub status_text: String,

    /// Application-specific error code.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i64,

    /// Error message.
    #[serde(rename = "error", default, skip_serializing_if = "String::is_empty")]
    pub error_text: String,

    /// Structured context, e.g. validation provenance.
    #[serde(default, skip_serializing_if = "context_is_empty")]
    pub context: Option<Fields>,

    #[serde(skip)]
    status: StatusCode,

    #[serde(skip)]
    source: Option<Error>,
}

fn is_zero(code: &i64) -> bool {
    *code == 0
}

fn context_is_empty(context: &Option<Fields>) -> bool {
    context.as_ref().map_or(true, serde_json::Map::is_empty)
}

impl ErrResponse {
    /// Resolved HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The classified error, when built by [`classify`].
    pub fn source_error(&self) -> Option<&Error> {
        self.source.as_ref()
    }

    /// Consumes the response and returns the classified error.
    pub fn into_source(self) -> Option<Error> {
        self.source
    }
}

impl fmt::Display for ErrResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_text.is_empty() {
            if self.status_text.is_empty() {
                return f.write_str(self.status.canonical_reason().unwrap_or_default());
            }
            return f.write_str(&self.status_text);
        }
        f.write_str(&self.error_text)
    }
}

impl std::error::Error for ErrResponse {}

impl ApiError for ErrResponse {
    fn http_status(&self) -> Option<StatusCode> {
        Some(self.status)
    }

    fn app_code(&self) -> Option<i64> {
        (self.code != 0).then_some(self.code)
    }

    fn fields(&self) -> Option<Fields> {
        self.context.clone()
    }
}

/// Classifies a handler error into an HTTP status and response body.
///
/// Resolution order:
///
/// 1. Start from `500` with the error's own message.
/// 2. If the chain contains an [`HttpError`](crate::HttpError), take its
///    status and (textual) message. When its internal error is itself an
///    `HttpError`, that inner one is used instead.
/// 3. A status capability anywhere in the chain overrides the status.
/// 4. Code and field capabilities fill `code` and `context`.
/// 5. A message equal to the status' reason phrase is dropped.
///
/// The function has no side effects; logging is left to the caller.
pub fn classify(err: Error) -> (StatusCode, ErrResponse) {
    let mut response = classify_ref(err.as_api());
    response.source = Some(err);
    (response.status, response)
}

/// Same as [`classify`] without taking ownership of the error.
pub fn classify_ref(err: &dyn ApiError) -> ErrResponse {
    let mut status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut error_text = err.to_string();

    if let Some(mut transport) = chain(err).find_map(ApiError::transport) {
        if let Some(inner) = transport.internal().and_then(|e| e.transport()) {
            transport = inner;
        }
        status = transport.status();
        if let Some(message) = transport.message().as_str() {
            error_text = message.to_string();
        }
    }

    if let Some(explicit) = chain(err).find_map(ApiError::http_status) {
        status = explicit;
    }

    let code = chain(err).find_map(ApiError::app_code).unwrap_or_default();
    let context = chain(err).find_map(ApiError::fields);

    if status.canonical_reason() == Some(error_text.as_str()) {
        error_text.clear();
    }

    ErrResponse {
        status_text: String::new(),
        code,
        error_text,
        context,
        status,
        source: None,
    }
}
