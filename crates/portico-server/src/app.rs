//! Request dispatch.
//!
//! [`App`] is the frozen form of a [`Service`](crate::Service). It takes a
//! request whose body has already been collected and produces a complete
//! response, so it can be driven by the HTTP server or directly by tests.
//!
//! Dispatch order:
//!
//! 1. reject bodies over the configured limit (`413`)
//! 2. look the route up; `HEAD` falls back to `GET` (`404`, `405`)
//! 3. run the route's guards in registration order
//! 4. bind, validate, call and project under the request timeout (`504`)
//! 5. classify any error into an [`ErrResponse`](portico_core::ErrResponse)

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode};
use portico_core::{classify, Error, HttpError};
use portico_docs::OpenApi;
use portico_extract::{BindConfig, OutputParts, RequestParts};
use portico_router::{Lookup, Params, Router};
use portico_telemetry::metrics::{self, InFlightGuard, UNMATCHED_ROUTE};
use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::context::Context;
use crate::guard::Guard;
use crate::handler::Interactor;

const JSON: &str = "application/json; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

/// What a route resolves to.
pub(crate) enum Endpoint {
    Operation(OperationRoute),
    Spec,
    SwaggerUi,
}

pub(crate) struct OperationRoute {
    pub(crate) handler: Arc<dyn Interactor>,
    pub(crate) guards: Vec<Arc<dyn Guard>>,
    /// Documented path, used as the route label in logs and metrics.
    pub(crate) route: String,
}

/// A built service, ready to answer requests.
///
/// Cheap to clone; clones share the route table.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    router: Router<Endpoint>,
    openapi: OpenApi,
    swagger_html: Option<Bytes>,
    config: ServerConfig,
    bind: BindConfig,
}

impl App {
    pub(crate) fn new(
        router: Router<Endpoint>,
        openapi: OpenApi,
        swagger: Option<portico_docs::SwaggerUi>,
        config: ServerConfig,
        bind: BindConfig,
    ) -> Self {
        Self {
            inner: Arc::new(AppInner {
                router,
                openapi,
                swagger_html: swagger.map(|ui| ui.html_bytes()),
                config,
                bind,
            }),
        }
    }

    /// The OpenAPI document.
    pub fn openapi(&self) -> &OpenApi {
        &self.inner.openapi
    }

    /// Server settings.
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Registered routes as `(method, pattern)`.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.inner
            .router
            .routes()
            .into_iter()
            .map(|(method, pattern, _)| (method.clone(), pattern.to_string()))
            .collect()
    }

    /// Answers one request.
    ///
    /// Never fails: every error becomes a response.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let _in_flight = InFlightGuard::new();
        let start = Instant::now();
        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        let (route, mut response) = if body.len() > self.inner.config.max_body_size() {
            let err = HttpError::new(StatusCode::PAYLOAD_TOO_LARGE).into();
            (None, self.error_response(&method, None, err))
        } else {
            self.dispatch(parts, body).await
        };

        if method == Method::HEAD {
            strip_body(&mut response);
        }

        let elapsed = start.elapsed();
        let status = response.status();
        metrics::record_request(
            method.as_str(),
            route.as_deref().unwrap_or(UNMATCHED_ROUTE),
            status.as_u16(),
            elapsed,
        );
        debug!(
            %method,
            path = %path,
            route = route.as_deref().unwrap_or(UNMATCHED_ROUTE),
            status = status.as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request completed"
        );
        response
    }

    async fn dispatch(&self, parts: Parts, body: Bytes) -> (Option<String>, Response<Bytes>) {
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        let (endpoint, pattern, params) = match self.find(&method, &path) {
            Ok(found) => found,
            Err(response) => return (None, response),
        };

        match endpoint {
            Endpoint::Spec => (Some(pattern.to_string()), self.spec_response(&method, pattern)),
            Endpoint::SwaggerUi => {
                let html = self.inner.swagger_html.clone().unwrap_or_default();
                (Some(pattern.to_string()), content(StatusCode::OK, HTML, html))
            }
            Endpoint::Operation(op) => {
                let route = op.route.clone();
                let timeout = self.inner.config.request_timeout();
                let result =
                    match tokio::time::timeout(timeout, self.run(op, parts, body, params)).await {
                        Ok(result) => result,
                        Err(_) => Err(HttpError::with_message(
                            StatusCode::GATEWAY_TIMEOUT,
                            "handler timed out",
                        )
                        .into()),
                    };
                let response = match result {
                    Ok(output) => output_response(output),
                    Err(err) => self.error_response(&method, Some(&route), err),
                };
                (Some(route), response)
            }
        }
    }

    /// Resolves a route. `HEAD` uses the `GET` route when it has none.
    #[allow(clippy::result_large_err)]
    fn find(&self, method: &Method, path: &str) -> Result<(&Endpoint, &str, Params), Response<Bytes>> {
        let mut lookup = self.inner.router.lookup(method, path);
        if *method == Method::HEAD && !matches!(lookup, Lookup::Found(_)) {
            if let found @ Lookup::Found(_) = self.inner.router.lookup(&Method::GET, path) {
                lookup = found;
            }
        }

        match lookup {
            Lookup::Found(matched) => Ok((matched.value, matched.pattern, matched.params)),
            Lookup::MethodNotAllowed { mut allowed } => {
                if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
                    allowed.push(Method::HEAD);
                }
                let mut response =
                    self.error_response(method, None, HttpError::method_not_allowed().into());
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.headers_mut().insert(ALLOW, value);
                }
                Err(response)
            }
            Lookup::NotFound => {
                Err(self.error_response(method, None, HttpError::not_found().into()))
            }
        }
    }

    async fn run(
        &self,
        op: &OperationRoute,
        parts: Parts,
        body: Bytes,
        params: Params,
    ) -> Result<OutputParts, Error> {
        let mut ctx = Context::new(
            parts.method.clone(),
            parts.uri.clone(),
            op.route.clone(),
            parts.headers.clone(),
            params.clone(),
        );
        for guard in &op.guards {
            if let Err(err) = guard.check(&mut ctx).await {
                debug!(route = %op.route, guard = guard.name(), "guard rejected request");
                return Err(err);
            }
        }

        let request = RequestParts::new(parts.method, parts.uri, parts.headers, body, params);
        op.handler.interact(ctx, request, &self.inner.bind).await
    }

    fn spec_response(&self, method: &Method, pattern: &str) -> Response<Bytes> {
        match self.inner.openapi.to_json() {
            Ok(json) => content(StatusCode::OK, JSON, Bytes::from(json)),
            Err(e) => self.error_response(method, Some(pattern), Error::from_std(e)),
        }
    }

    fn error_response(&self, method: &Method, route: Option<&str>, err: Error) -> Response<Bytes> {
        let message = err.to_string();
        let (status, body) = classify(err);
        let route = route.unwrap_or(UNMATCHED_ROUTE);
        if status.is_server_error() {
            error!(%method, route, status = status.as_u16(), error = %message, "request failed");
        } else {
            debug!(%method, route, status = status.as_u16(), error = %message, "request rejected");
        }
        let json = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());
        content(status, JSON, Bytes::from(json))
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.inner.router.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

fn content(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn output_response(output: OutputParts) -> Response<Bytes> {
    let json = serde_json::to_vec(&output.body).unwrap_or_else(|_| b"null".to_vec());
    let mut response = content(StatusCode::OK, JSON, Bytes::from(json));
    let headers = response.headers_mut();
    for (name, value) in &output.headers {
        headers.append(name.clone(), value.clone());
    }
    response
}

/// Drops the body of a `HEAD` response, keeping its length.
pub(crate) fn strip_body(response: &mut Response<Bytes>) {
    let length = response.body().len();
    *response.body_mut() = Bytes::new();
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(length));
}
