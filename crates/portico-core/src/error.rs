//! Error model for Portico handlers.
//!
//! Handlers return [`Error`], a boxed [`ApiError`]. An `ApiError` is an
//! ordinary `std::error::Error` that may additionally expose any subset of
//! three capabilities:
//!
//! | Capability | Method | Effect on the response |
//! |---|---|---|
//! | status | [`ApiError::http_status`] | HTTP status code |
//! | code | [`ApiError::app_code`] | `code` member of the body |
//! | fields | [`ApiError::fields`] | `context` member of the body |
//!
//! Errors form a chain through [`ApiError::wrapped`]. The classifier
//! ([`crate::classify`]) looks for each capability along the whole chain,
//! outermost first.
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use portico_core::{classify, Error, HttpError, ResultExt};
//!
//! fn load(id: &str) -> Result<String, Error> {
//!     if id.is_empty() {
//!         return Err(HttpError::with_message(StatusCode::BAD_REQUEST, "missing id").into());
//!     }
//!     std::fs::read_to_string(id).with_status(StatusCode::NOT_FOUND)
//! }
//!
//! let (status, body) = classify(load("").unwrap_err());
//! assert_eq!(status, StatusCode::BAD_REQUEST);
//! assert_eq!(body.error_text, "missing id");
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;

use http::StatusCode;
use serde_json::Value;

/// Structured context attached to an error response.
pub type Fields = serde_json::Map<String, Value>;

/// Result alias for handler code.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that can describe how it should be rendered over HTTP.
///
/// All methods have defaults, so a plain error type only needs an empty
/// `impl ApiError for MyError {}` to be usable as a handler error.
pub trait ApiError: StdError + Send + Sync + 'static {
    /// HTTP status this error asks for.
    fn http_status(&self) -> Option<StatusCode> {
        None
    }

    /// Application-level error code.
    fn app_code(&self) -> Option<i64> {
        None
    }

    /// Structured context rendered as the `context` member.
    fn fields(&self) -> Option<Fields> {
        None
    }

    /// The wrapped error, one level down.
    fn wrapped(&self) -> Option<&dyn ApiError> {
        None
    }

    /// Returns `Some` only for the transport error type [`HttpError`].
    fn transport(&self) -> Option<&HttpError> {
        None
    }
}

/// Iterator over an error and its causes, outermost first.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a dyn ApiError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a dyn ApiError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.wrapped();
        Some(current)
    }
}

/// Walks `err` and everything it wraps.
pub fn chain(err: &dyn ApiError) -> Chain<'_> {
    Chain { next: Some(err) }
}

/// Owned, type-erased handler error.
///
/// Any [`ApiError`] converts into `Error` with `?`. Errors that only
/// implement `std::error::Error` go through [`Error::from_std`].
pub struct Error {
    inner: Box<dyn ApiError>,
}

impl Error {
    /// Wraps a concrete error.
    pub fn new<E: ApiError>(error: E) -> Self {
        Self {
            inner: Box::new(error),
        }
    }

    /// Creates an error from a message, with no capabilities.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(Message(message.to_string()))
    }

    /// Wraps a foreign error that does not implement [`ApiError`].
    pub fn from_std<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(Opaque(Box::new(error)))
    }

    /// Borrows the error as a trait object.
    pub fn as_api(&self) -> &dyn ApiError {
        &*self.inner
    }

    /// Iterates this error and its causes.
    pub fn chain(&self) -> Chain<'_> {
        chain(self.as_api())
    }

    /// First transport error in the chain.
    pub fn transport_error(&self) -> Option<&HttpError> {
        self.chain().find_map(ApiError::transport)
    }

    /// Wraps this error with an HTTP status.
    pub fn with_status(self, status: StatusCode) -> Self {
        Self::new(Layer {
            status: Some(status),
            ..Layer::over(self)
        })
    }

    /// Wraps this error with an application code.
    pub fn with_code(self, code: i64) -> Self {
        Self::new(Layer {
            code: Some(code),
            ..Layer::over(self)
        })
    }

    /// Wraps this error with structured context.
    pub fn with_fields(self, fields: Fields) -> Self {
        Self::new(Layer {
            fields: Some(fields),
            ..Layer::over(self)
        })
    }

    /// Wraps this error with a message that replaces its display text.
    pub fn context(self, message: impl fmt::Display) -> Self {
        Self::new(Layer {
            message: Some(message.to_string()),
            ..Layer::over(self)
        })
    }
}

impl Deref for Error {
    type Target = dyn ApiError;

    fn deref(&self) -> &Self::Target {
        self.as_api()
    }
}

impl<E: ApiError> From<E> for Error {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Builder methods from [`Error`] on any fallible result.
pub trait ResultExt<T> {
    /// See [`Error::with_status`].
    fn with_status(self, status: StatusCode) -> Result<T>;
    /// See [`Error::with_code`].
    fn with_code(self, code: i64) -> Result<T>;
    /// See [`Error::with_fields`].
    fn with_fields(self, fields: Fields) -> Result<T>;
    /// See [`Error::context`].
    fn context<C: fmt::Display>(self, message: C) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_status(self, status: StatusCode) -> Result<T> {
        self.map_err(|e| e.into().with_status(status))
    }

    fn with_code(self, code: i64) -> Result<T> {
        self.map_err(|e| e.into().with_code(code))
    }

    fn with_fields(self, fields: Fields) -> Result<T> {
        self.map_err(|e| e.into().with_fields(fields))
    }

    fn context<C: fmt::Display>(self, message: C) -> Result<T> {
        self.map_err(|e| e.into().context(message))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl ApiError for Message {}

#[derive(Debug)]
struct Opaque(Box<dyn StdError + Send + Sync>);

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Opaque {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl ApiError for Opaque {}

/// One wrapping layer added by the `with_*` builders.
#[derive(Debug)]
struct Layer {
    message: Option<String>,
    status: Option<StatusCode>,
    code: Option<i64>,
    fields: Option<Fields>,
    cause: Error,
}

impl Layer {
    fn over(cause: Error) -> Self {
        Self {
            message: None,
            status: None,
            code: None,
            fields: None,
            cause,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => fmt::Display::fmt(&self.cause, f),
        }
    }
}

impl StdError for Layer {}

impl ApiError for Layer {
    fn http_status(&self) -> Option<StatusCode> {
        self.status
    }

    fn app_code(&self) -> Option<i64> {
        self.code
    }

    fn fields(&self) -> Option<Fields> {
        self.fields.clone()
    }

    fn wrapped(&self) -> Option<&dyn ApiError> {
        Some(self.cause.as_api())
    }
}

/// A bare HTTP status used as an error.
///
/// Displays as the canonical reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpCode(pub StatusCode);

impl fmt::Display for HttpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.canonical_reason() {
            Some(reason) => f.write_str(reason),
            None => write!(f, "{}", self.0.as_u16()),
        }
    }
}

impl StdError for HttpCode {}

impl ApiError for HttpCode {
    fn http_status(&self) -> Option<StatusCode> {
        Some(self.0)
    }
}

/// Transport-level error raised by routing, binding and other framework code.
///
/// Its status is applied by the classifier's transport step only; it is not
/// a status capability, so a status capability elsewhere in the chain wins.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: Value,
    internal: Option<Error>,
}

impl HttpError {
    /// Creates an error whose message is the canonical reason phrase.
    pub fn new(status: StatusCode) -> Self {
        let message = status
            .canonical_reason()
            .map_or(Value::Null, |r| Value::String(r.to_string()));
        Self {
            status,
            message,
            internal: None,
        }
    }

    /// Creates an error with a custom message (a string or any JSON value).
    pub fn with_message(status: StatusCode, message: impl Into<Value>) -> Self {
        Self {
            status,
            message: message.into(),
            internal: None,
        }
    }

    /// Attaches the error that caused this one.
    pub fn with_internal(mut self, internal: impl Into<Error>) -> Self {
        self.internal = Some(internal.into());
        self
    }

    /// `400 Bad Request` with a message.
    pub fn bad_request(message: impl Into<Value>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, message)
    }

    /// `404 Not Found`.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// `405 Method Not Allowed`.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the message value.
    pub fn message(&self) -> &Value {
        &self.message
    }

    /// Returns the wrapped internal error.
    pub fn internal(&self) -> Option<&Error> {
        self.internal.as_ref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}, message=", self.status.as_u16())?;
        match &self.message {
            Value::String(s) => f.write_str(s)?,
            other => write!(f, "{other}")?,
        }
        if let Some(internal) = &self.internal {
            write!(f, ", internal={internal}")?;
        }
        Ok(())
    }
}

impl StdError for HttpError {}

impl ApiError for HttpError {
    fn wrapped(&self) -> Option<&dyn ApiError> {
        self.internal.as_ref().map(Error::as_api)
    }

    fn transport(&self) -> Option<&HttpError> {
        Some(self)
    }
}

impl ApiError for std::io::Error {}
impl ApiError for std::fmt::Error {}
impl ApiError for serde_json::Error {}
impl ApiError for std::num::ParseIntError {}
impl ApiError for std::num::ParseFloatError {}
impl ApiError for std::str::ParseBoolError {}
impl ApiError for std::str::Utf8Error {}
impl ApiError for std::string::FromUtf8Error {}
