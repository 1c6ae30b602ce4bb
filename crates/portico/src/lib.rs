//! # Portico
//!
//! **Typed HTTP handlers with location-aware validation and generated
//! OpenAPI documents.**
//!
//! A handler is an async function from one input struct to one output
//! struct. Field attributes say where each input field comes from (path,
//! query, header, cookie, JSON body, urlencoded form or multipart form) and
//! which constraints it must meet. From those same attributes Portico:
//!
//! - binds requests, applying declared defaults first
//! - validates each location separately and reports the first failing one
//!   as `400` with `"<location>:<field>"` keys in the error context
//! - writes output `header` and `cookie` fields to the response
//! - documents every route in an OpenAPI 3 document served next to Swagger UI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portico::prelude::*;
//!
//! #[derive(Serialize, Deserialize, Describe)]
//! #[param(crate = "portico::schema")]
//! struct HelloInput {
//!     #[param(path = "name", json = "-", min_length = 3)]
//!     name: String,
//!     #[param(query = "locale", json = "-", default = "en-US", enum = "en-US,zh-CN")]
//!     locale: String,
//! }
//!
//! #[derive(Serialize, Deserialize, Describe)]
//! #[param(crate = "portico::schema")]
//! struct HelloOutput {
//!     message: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut service = Service::new("/api");
//!     service.get(
//!         "/hello/:name",
//!         Handler::new(|_ctx: Context, input: HelloInput| async move {
//!             Ok(HelloOutput { message: format!("Hello, {}!", input.name) })
//!         }),
//!     );
//!     service.docs("/docs", Default::default());
//!     service.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! The derive macro refers to `::portico_schema` unless told otherwise;
//! crates that only depend on `portico` set `#[param(crate = "portico::schema")]`.
//!
//! ## Request pipeline
//!
//! ```text
//! Request → body limit → route → guards → bind (defaults first) → validate
//!                                                                    ↓
//! Response ← classify errors ← project output ← handler ←───────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use portico_core as core;

// Re-export shape descriptors and the validator
pub use portico_schema as schema;

// Re-export the router
pub use portico_router as router;

// Re-export binding and output projection
pub use portico_extract as extract;

// Re-export OpenAPI types
pub use portico_docs as docs;

// Re-export the service builder and server
pub use portico_server as server;

// Re-export configuration
pub use portico_config as config;

// Re-export logging and metrics
pub use portico_telemetry as telemetry;

// Re-export serde_json for docs settings and handler bodies
pub use serde_json;

// Re-export the derive macro
pub use portico_macros::Describe;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use portico_core::{ApiError, ErrResponse, Error, HttpError, ResultExt, StatusCode};

    pub use portico_schema::{validate, Describe as _, FormFile, TypeInfo, ValidatorError};

    pub use portico_macros::Describe;

    pub use portico_docs::{ApiKeyLocation, OpenApi, SecurityScheme};

    pub use portico_server::{
        options, App, BasicAuth, BearerAuth, Context, Group, Guard, Handler, Scheme, Server,
        ServerConfig, Service, ShutdownSignal,
    };

    pub use portico_config::{ConfigLoader, PorticoConfig};

    pub use portico_telemetry::{init_logging, LogConfig, LogFormat};

    pub use serde_json::{json, Map, Value};
}
