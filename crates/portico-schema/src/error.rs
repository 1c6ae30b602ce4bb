//! Validation errors.

use std::fmt;

use portico_core::{ApiError, Fields, ParamLocation, StatusCode};
use serde_json::Value;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// JSON pointer of the failing value within its location, e.g. `/username`.
    pub pointer: String,
    /// Human-readable message.
    pub message: String,
}

impl Cause {
    /// Creates a cause.
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// Request validation failed for one location.
///
/// Renders as status 400 with a `context` object keyed by
/// `<location>:<pointer>`:
///
/// ```json
/// {"error": "Validation Error", "context": {"json:username": "\"ab\" is shorter than 3 characters"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation Error")]
pub struct ValidatorError {
    /// The location whose schema failed.
    pub location: ParamLocation,
    /// All failures in that location, in encounter order.
    pub causes: Vec<Cause>,
}

impl ValidatorError {
    /// Creates an error for `location`.
    pub fn new(location: ParamLocation, causes: Vec<Cause>) -> Self {
        Self { location, causes }
    }

    /// Provenance map: one key per failing field, a string for a single
    /// message and an array once the same key fails more than once.
    pub fn provenance(&self) -> Fields {
        let mut fields = Fields::new();
        for cause in &self.causes {
            let pointer = cause.pointer.strip_prefix('/').unwrap_or(&cause.pointer);
            let key = format!("{}:{}", self.location.tag(), pointer);
            let message = Value::String(cause.message.clone());
            match fields.get_mut(&key) {
                None => {
                    fields.insert(key, message);
                }
                Some(Value::Array(messages)) => messages.push(message),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, message]);
                }
            }
        }
        fields
    }
}

impl ApiError for ValidatorError {
    fn http_status(&self) -> Option<StatusCode> {
        Some(StatusCode::BAD_REQUEST)
    }

    fn fields(&self) -> Option<Fields> {
        Some(self.provenance())
    }
}
