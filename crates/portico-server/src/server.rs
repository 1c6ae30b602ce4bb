//! HTTP server.
//!
//! Serves an [`App`] over HTTP/1.1 with Hyper and Tokio.
//!
//! - TCP listener bound to the configured address
//! - one task per connection
//! - bodies collected up to the configured limit before dispatch
//! - graceful shutdown: stop accepting, then wait for open connections up
//!   to the shutdown timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use portico_server::{Server, Service};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut service = Service::new("/api");
//!     service.get("/hello/:name", hello());
//!
//!     Server::new(service.build()).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use portico_core::{classify, HttpError};
use tokio::net::{TcpListener, TcpStream};

use crate::app::{strip_body, App};
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// The Portico HTTP server.
#[derive(Debug, Clone)]
pub struct Server {
    app: App,
}

impl Server {
    /// Creates a server for `app`, using the app's server settings.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// The served app.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Runs until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let config = self.app.config().clone();
        let addr = config.socket_addr().map_err(|e| {
            ServerError::BindError(format!("Invalid address '{}': {}", config.http_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {addr}: {e}")))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let shutdown_timeout = server.app.config().shutdown_timeout();
        tracing::info!(
            timeout = ?shutdown_timeout,
            connections = tracker.active_connections(),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_drain() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    connections = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(%remote_addr, "finishing connection for shutdown");
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
        let config = self.app.config();
        let (parts, body) = req.into_parts();

        let collected = tokio::time::timeout(
            config.request_timeout(),
            Limited::new(body, config.max_body_size()).collect(),
        )
        .await;

        let body = match collected {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
                return Ok(transport_error(&parts.method, HttpError::new(StatusCode::PAYLOAD_TOO_LARGE)));
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "failed to read request body");
                let err = HttpError::bad_request(format!("failed to read request body: {e}"));
                return Ok(transport_error(&parts.method, err));
            }
            Err(_) => {
                tracing::warn!(method = %parts.method, path = %parts.uri.path(), "request body timed out");
                return Ok(transport_error(&parts.method, HttpError::new(StatusCode::REQUEST_TIMEOUT)));
            }
        };

        let response = self.app.handle(Request::from_parts(parts, body)).await;
        Ok(response.map(Full::new))
    }
}

/// Response for failures before the request reaches the app.
fn transport_error(method: &Method, err: HttpError) -> HttpResponse {
    transport_response(method, err).map(Full::new)
}

fn transport_response(method: &Method, err: HttpError) -> Response<Bytes> {
    let (status, body) = classify(err.into());
    let json = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Bytes::from(json));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json; charset=utf-8"),
    );
    if method == Method::HEAD {
        strip_body(&mut response);
    }
    response
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ServerConfig;
    use crate::service::Service;

    #[test]
    fn test_transport_error_body() {
        let response = transport_response(&Method::POST, HttpError::new(StatusCode::PAYLOAD_TOO_LARGE));
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(serde_json::from_slice::<serde_json::Value>(response.body()).is_ok());
    }

    #[test]
    fn test_transport_error_head_has_no_body() {
        let full = transport_response(&Method::GET, HttpError::new(StatusCode::REQUEST_TIMEOUT));
        let head = transport_response(&Method::HEAD, HttpError::new(StatusCode::REQUEST_TIMEOUT));
        assert_eq!(head.status(), StatusCode::REQUEST_TIMEOUT);
        assert!(head.body().is_empty());
        assert_eq!(
            head.headers()[http::header::CONTENT_LENGTH],
            full.body().len().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig::builder().http_addr("not an address").build();
        let app = Service::new("").with_server_config(config).build();

        let result = Server::new(app).run_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::BindError(_))));
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig::builder()
            .shutdown_timeout(Duration::from_millis(50))
            .build();
        let app = Service::new("").with_server_config(config).build();

        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(Server::new(app).serve(listener, shutdown.clone()));
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
