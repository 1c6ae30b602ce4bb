//! Service and route groups.
//!
//! A [`Service`] collects routes and the OpenAPI document describing them.
//! Registering a handler synthesizes its operation from the input shape and
//! output type, applies group options and then handler options, and adds
//! it to the document under the route's path with `:param` written as
//! `{param}`. Once every route is in place, [`Service::build`] freezes the
//! route table into an [`App`].
//!
//! ```rust,ignore
//! let mut service = Service::new("/api");
//! service.with_http_bearer_security("bearerAuth");
//! service.post("/login", login());
//!
//! service
//!     .group("/admin")
//!     .tags(["Admin"])
//!     .security("bearerAuth")
//!     .guard(BearerAuth::new(verify))
//!     .get("/hello", hello());
//!
//! service.docs("/docs", Map::new());
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use portico_config::PorticoConfig;
use portico_docs::{
    error_response_schema, synthesize, ApiKeyLocation, DocsPaths, OpenApi, Operation, Schema,
    SecurityScheme, SwaggerUi, ERR_RESPONSE,
};
use portico_extract::{BindConfig, MultipartConfig};
use portico_router::{join_path, to_openapi_path, Router};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::app::{App, Endpoint, OperationRoute};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::guard::Guard;
use crate::handler::Interactor;
use crate::options::{self, OperationOption};
use crate::server::Server;

/// HTTP authentication schemes for [`Service::with_http_security`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `Authorization: Bearer <token>`.
    Bearer,
    /// `Authorization: Basic <credentials>`.
    Basic,
}

impl Scheme {
    /// Scheme name as written in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::Basic => "basic",
        }
    }
}

/// Routes, their documentation and server settings.
pub struct Service {
    base_url: String,
    openapi: OpenApi,
    router: Router<Endpoint>,
    swagger: Option<SwaggerUi>,
    config: ServerConfig,
    bind: BindConfig,
}

impl Service {
    /// Creates a service whose routes live under `base_url`.
    ///
    /// A non-empty base URL is also listed as the document's server.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mut openapi = OpenApi::default();
        if !base_url.is_empty() {
            openapi.add_server(base_url.clone());
        }
        let config = ServerConfig::default();
        Self {
            base_url,
            openapi,
            router: Router::new(),
            swagger: None,
            bind: bind_config(&config),
            config,
        }
    }

    /// Creates a service from loaded configuration.
    ///
    /// Sets the base URL, server limits and document info, and mounts the
    /// docs endpoints when enabled.
    pub fn from_config(config: &PorticoConfig) -> Self {
        let mut service = Self::new(config.server.base_url.clone())
            .with_server_config(ServerConfig::from(&config.server));
        service.openapi.info.title = config.docs.title.clone();
        service.openapi.info.version = config.docs.version.clone();
        service.openapi.info.description = config.docs.description.clone();
        if config.docs.enabled {
            service.docs(&config.docs.path, Map::new());
        }
        service
    }

    /// Replaces the server settings.
    #[must_use]
    pub fn with_server_config(mut self, config: ServerConfig) -> Self {
        self.bind = bind_config(&config);
        self.config = config;
        self
    }

    /// Base URL every route is mounted under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server settings.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The OpenAPI document.
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// The OpenAPI document, for edits not covered by the helpers.
    pub fn openapi_mut(&mut self) -> &mut OpenApi {
        &mut self.openapi
    }

    /// Sets the document title and version.
    pub fn info(&mut self, title: impl Into<String>, version: impl Into<String>) -> &mut Self {
        self.openapi.info.title = title.into();
        self.openapi.info.version = version.into();
        self
    }

    /// Sets the document description.
    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.openapi.info.description = Some(description.into());
        self
    }

    /// Registers a `GET` route.
    pub fn get(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    pub fn post(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::POST, pattern, handler)
    }

    /// Registers a `PUT` route.
    pub fn put(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::PUT, pattern, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::PATCH, pattern, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Registers a `HEAD` route.
    pub fn head(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::HEAD, pattern, handler)
    }

    /// Registers a route for any method.
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.add(method, "", &[], &[], pattern, Arc::new(handler));
        self
    }

    /// Opens a route group under `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            service: self,
            prefix: prefix.to_string(),
            options: Vec::new(),
            guards: Vec::new(),
        }
    }

    /// Serves the document at `<base><pattern>/openapi.json` and Swagger UI
    /// at `<base><pattern>`.
    ///
    /// `settings` are merged into the Swagger UI configuration.
    pub fn docs(&mut self, pattern: &str, settings: Map<String, Value>) -> &mut Self {
        let paths = DocsPaths::new(&self.base_url, pattern);
        self.swagger = Some(SwaggerUi::new(paths.spec.clone()).settings(settings));

        self.insert_endpoint(Method::GET, &paths.spec, Endpoint::Spec);
        self.insert_endpoint(Method::GET, &paths.ui, Endpoint::SwaggerUi);
        if paths.ui != "/" {
            let assets = join_path(&paths.ui, "*page");
            self.insert_endpoint(Method::GET, &assets, Endpoint::SwaggerUi);
        }
        debug!(ui = %paths.ui, spec = %paths.spec, "docs mounted");
        self
    }

    /// Declares a security scheme under `key`.
    pub fn with_security(&mut self, key: impl Into<String>, scheme: SecurityScheme) -> &mut Self {
        self.openapi.add_security_scheme(key, scheme);
        self
    }

    /// Declares an HTTP bearer scheme.
    pub fn with_http_bearer_security(&mut self, key: impl Into<String>) -> &mut Self {
        self.with_http_security(key, Scheme::Bearer)
    }

    /// Declares an HTTP basic scheme.
    pub fn with_http_basic_security(&mut self, key: impl Into<String>) -> &mut Self {
        self.with_http_security(key, Scheme::Basic)
    }

    /// Declares an HTTP authentication scheme.
    pub fn with_http_security(&mut self, key: impl Into<String>, scheme: Scheme) -> &mut Self {
        self.with_security(key, SecurityScheme::http(scheme.as_str()))
    }

    /// Declares an API key scheme read from `name` in `location`.
    pub fn with_api_key_security(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        location: ApiKeyLocation,
    ) -> &mut Self {
        self.with_security(key, SecurityScheme::api_key(name, location))
    }

    /// Adds document-level tags.
    pub fn with_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.openapi.add_tag(tag);
        }
        self
    }

    /// Freezes the routes into a servable [`App`].
    pub fn build(self) -> App {
        let swagger = self
            .swagger
            .map(|ui| ui.title(format!("{} - Swagger UI", self.openapi.info.title)));
        App::new(self.router, self.openapi, swagger, self.config, self.bind)
    }

    /// Builds the app and serves it until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind.
    pub async fn run(self) -> Result<(), ServerError> {
        Server::new(self.build()).run().await
    }

    fn add(
        &mut self,
        method: Method,
        prefix: &str,
        group_options: &[OperationOption],
        guards: &[Arc<dyn Guard>],
        pattern: &str,
        handler: Arc<dyn Interactor>,
    ) {
        let relative = join_path(prefix, pattern);
        let doc_path = to_openapi_path(&relative);

        let mut operation = synthesize(&handler.input(), &handler.output());
        for option in group_options.iter().chain(handler.options()) {
            option.apply(&mut operation);
        }
        if uses_error_schema(&operation) {
            self.openapi.add_schema(ERR_RESPONSE, error_response_schema());
        }
        if let Err(e) = self.openapi.add_operation(&method, &doc_path, operation) {
            warn!(%method, path = %doc_path, error = %e, "operation not documented");
        }

        let route = join_path(&self.base_url, &relative);
        let endpoint = Endpoint::Operation(OperationRoute {
            handler,
            guards: guards.to_vec(),
            route: doc_path,
        });
        self.insert_endpoint(method, &route, endpoint);
    }

    fn insert_endpoint(&mut self, method: Method, route: &str, endpoint: Endpoint) {
        match self.router.insert(method.clone(), route, endpoint) {
            Ok(()) => debug!(%method, %route, "route registered"),
            Err(e) => warn!(%method, %route, error = %e, "route not registered"),
        }
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("base_url", &self.base_url)
            .field("routes", &self.router.len())
            .field("docs", &self.swagger.is_some())
            .finish()
    }
}

fn bind_config(config: &ServerConfig) -> BindConfig {
    let max = u64::try_from(config.max_body_size()).unwrap_or(u64::MAX);
    BindConfig {
        multipart: MultipartConfig::default().max_field_size(max),
    }
}

fn uses_error_schema(operation: &Operation) -> bool {
    let reference = Schema::component(ERR_RESPONSE);
    operation
        .responses
        .values()
        .flat_map(|response| response.content.values())
        .any(|media| media.schema.as_ref() == Some(&reference))
}

/// Routes sharing a prefix, operation options and guards.
///
/// Groups borrow their service; build them, register routes, and let them
/// drop.
pub struct Group<'s> {
    service: &'s mut Service,
    prefix: String,
    options: Vec<OperationOption>,
    guards: Vec<Arc<dyn Guard>>,
}

impl<'s> Group<'s> {
    /// Adds an operation option for every route in the group.
    #[must_use]
    pub fn option(mut self, option: impl Into<OperationOption>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Adds tags to every route in the group.
    #[must_use]
    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(options::tags(tags))
    }

    /// Requires a security scheme on every route in the group.
    #[must_use]
    pub fn security(self, key: impl Into<String>) -> Self {
        self.option(options::security(key))
    }

    /// Runs `guard` before every handler in the group.
    #[must_use]
    pub fn guard(mut self, guard: impl Guard) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Group prefix relative to the base URL.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Opens a nested group. It inherits this group's options and guards.
    pub fn sub_group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            service: &mut *self.service,
            prefix: join_path(&self.prefix, prefix),
            options: self.options.clone(),
            guards: self.guards.clone(),
        }
    }

    /// Registers a `GET` route.
    pub fn get(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    pub fn post(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::POST, pattern, handler)
    }

    /// Registers a `PUT` route.
    pub fn put(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::PUT, pattern, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::PATCH, pattern, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Registers a `HEAD` route.
    pub fn head(&mut self, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.route(Method::HEAD, pattern, handler)
    }

    /// Registers a route for any method.
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Interactor) -> &mut Self {
        self.service.add(
            method,
            &self.prefix,
            &self.options,
            &self.guards,
            pattern,
            Arc::new(handler),
        );
        self
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("options", &self.options.len())
            .field("guards", &self.guards.len())
            .finish()
    }
}
