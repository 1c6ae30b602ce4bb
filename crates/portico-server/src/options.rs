//! Operation options.
//!
//! An option edits the synthesized OpenAPI operation of a route. Group
//! options apply first, then the handler's own, so a handler can override
//! what its group sets.
//!
//! ```rust,ignore
//! use portico_server::options;
//!
//! let admin = service
//!     .group("/admin")
//!     .option(options::tags(["Admin"]))
//!     .option(options::security("bearerAuth"));
//! ```

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use portico_docs::{error_response, Operation};

/// A function applied to a route's OpenAPI operation.
#[derive(Clone)]
pub struct OperationOption(Arc<dyn Fn(&mut Operation) + Send + Sync>);

impl OperationOption {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&mut Operation) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Applies the option.
    pub fn apply(&self, operation: &mut Operation) {
        (self.0)(operation);
    }
}

impl fmt::Debug for OperationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperationOption")
    }
}

impl<F> From<F> for OperationOption
where
    F: Fn(&mut Operation) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Sets the summary.
pub fn summary(text: impl Into<String>) -> OperationOption {
    let text = text.into();
    OperationOption::new(move |op| op.summary = Some(text.clone()))
}

/// Sets the description.
pub fn description(text: impl Into<String>) -> OperationOption {
    let text = text.into();
    OperationOption::new(move |op| op.description = Some(text.clone()))
}

/// Adds tags, skipping ones already present.
pub fn tags<I, S>(tags: I) -> OperationOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
    OperationOption::new(move |op| op.add_tags(tags.iter().cloned()))
}

/// Sets the operation id.
pub fn operation_id(id: impl Into<String>) -> OperationOption {
    let id = id.into();
    OperationOption::new(move |op| op.operation_id = Some(id.clone()))
}

/// Marks the operation deprecated.
pub fn deprecated() -> OperationOption {
    OperationOption::new(|op| op.deprecated = true)
}

/// Requires the security scheme `key` and documents the `401` it can cause.
///
/// The scheme itself is declared on the service, e.g. with
/// [`Service::with_http_bearer_security`](crate::Service::with_http_bearer_security).
pub fn security(key: impl Into<String>) -> OperationOption {
    let key = key.into();
    OperationOption::new(move |op| {
        op.add_security(key.clone());
        op.set_response(StatusCode::UNAUTHORIZED, error_response("Unauthorized"));
    })
}
