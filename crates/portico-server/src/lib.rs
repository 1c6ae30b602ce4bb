//! # Portico Server
//!
//! Service builder, request dispatch and HTTP server for Portico.
//!
//! - [`Service`] and [`Group`] register typed [`Handler`]s and build the
//!   OpenAPI document as they go
//! - [`App`] answers requests: routing, guards, binding, validation,
//!   output projection and error classification
//! - [`Server`] serves an [`App`] over HTTP/1.1 with graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use portico_server::{Context, Handler, Server, Service};
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
//!
//!     Server::new(service.build()).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod context;
mod error;
mod guard;
mod handler;
pub mod options;
mod server;
mod service;
mod shutdown;

pub use app::App;
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use context::Context;
pub use error::ServerError;
pub use guard::{BasicAuth, BearerAuth, BoxFuture, Guard};
pub use handler::{Handler, Interactor};
pub use options::OperationOption;
pub use server::{HttpResponse, ResponseBody, Server};
pub use service::{Group, Scheme, Service};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
