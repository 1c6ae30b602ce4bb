//! Per-request context handed to guards and handlers.

use http::{Extensions, HeaderMap, Method, Uri};
use portico_router::Params;

/// What a handler can see of the request besides its bound input.
///
/// Guards run first and may stash values (an authenticated user, a tenant)
/// in the extensions for the handler to pick up.
#[derive(Debug, Clone)]
pub struct Context {
    method: Method,
    uri: Uri,
    route: String,
    headers: HeaderMap,
    params: Params,
    extensions: Extensions,
}

impl Context {
    /// Creates a context for a matched request.
    pub fn new(method: Method, uri: Uri, route: impl Into<String>, headers: HeaderMap, params: Params) -> Self {
        Self {
            method,
            uri,
            route: route.into(),
            headers,
            params,
            extensions: Extensions::new(),
        }
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Matched route in document form, e.g. `/users/{id}`.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Captured path parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Stores a value for later stages.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    /// A value stored by an earlier stage.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// All stored values.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// All stored values, mutably.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant", "acme".parse().unwrap());
        let params: Params = [("id".to_string(), "7".to_string())].into_iter().collect();
        Context::new(
            Method::GET,
            "/users/7?full=1".parse().unwrap(),
            "/users/{id}",
            headers,
            params,
        )
    }

    #[test]
    fn test_accessors() {
        let ctx = context();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/users/7");
        assert_eq!(ctx.route(), "/users/{id}");
        assert_eq!(ctx.header("X-Tenant"), Some("acme"));
        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.param("name"), None);
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct User(&'static str);

        let mut ctx = context();
        assert!(ctx.get::<User>().is_none());
        ctx.insert(User("jon"));
        assert_eq!(ctx.get::<User>(), Some(&User("jon")));
    }
}
