//! Router API.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::{parse_path, Node, Route, Segment};
use crate::params::Params;

/// Route registration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Same method and path registered twice.
    #[error("route {method} {pattern} is already registered")]
    Conflict {
        /// Method.
        method: Method,
        /// Pattern.
        pattern: String,
    },
    /// A wildcard segment that is not last.
    #[error("wildcard must be the last segment in {0}")]
    WildcardNotLast(String),
    /// A parameter or wildcard without a name.
    #[error("unnamed parameter in {0}")]
    UnnamedParam(String),
}

/// Result of a lookup.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// Path and method matched.
    Found(RouteMatch<'a, T>),
    /// Path matched under other methods.
    MethodNotAllowed {
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },
    /// Nothing matched.
    NotFound,
}

/// A matched route.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    /// Route value.
    pub value: &'a T,
    /// Pattern as registered.
    pub pattern: &'a str,
    /// Captured parameters.
    pub params: Params,
}

/// Segment tree router with values of type `T`.
///
/// Path syntax: literal segments, `{name}` or `:name` parameters and a
/// trailing `*name` wildcard. Static segments win over parameters and
/// parameters win over wildcards.
///
/// ```rust
/// use portico_router::{Lookup, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(Method::GET, "/users/:id", "getUser").unwrap();
///
/// let Lookup::Found(found) = router.lookup(&Method::GET, "/users/7") else {
///     panic!("no match");
/// };
/// assert_eq!(*found.value, "getUser");
/// assert_eq!(found.params.get("id"), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers a route.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        let segments = parse_path(pattern);
        let mut names = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Static(_) => {}
                Segment::Param(name) | Segment::Wildcard(name) if name.is_empty() => {
                    return Err(RouteError::UnnamedParam(pattern.to_string()));
                }
                Segment::Wildcard(_) if index + 1 != segments.len() => {
                    return Err(RouteError::WildcardNotLast(pattern.to_string()));
                }
                Segment::Param(name) | Segment::Wildcard(name) => names.push(name.clone()),
            }
        }

        let routes = self.root.endpoint_mut(&segments);
        if routes.contains(&method) {
            return Err(RouteError::Conflict {
                method,
                pattern: pattern.to_string(),
            });
        }
        routes.set(
            method,
            Route {
                pattern: pattern.to_string(),
                names,
                value,
            },
        );
        self.route_count += 1;
        Ok(())
    }

    /// Looks up a request.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let Some((routes, values)) = self.root.find(path) else {
            return Lookup::NotFound;
        };
        match routes.get(method) {
            Some(route) => Lookup::Found(RouteMatch {
                value: &route.value,
                pattern: &route.pattern,
                params: route.names.iter().cloned().zip(values).collect(),
            }),
            None => Lookup::MethodNotAllowed {
                allowed: routes.methods().cloned().collect(),
            },
        }
    }

    /// Method table for a path, if the path matches.
    #[must_use]
    pub fn methods_for(&self, path: &str) -> Option<&MethodRouter<Route<T>>> {
        self.root.find(path).map(|(routes, _)| routes)
    }

    /// All routes as `(method, pattern, value)`.
    #[must_use]
    pub fn routes(&self) -> Vec<(&Method, &str, &T)> {
        let mut out = Vec::with_capacity(self.route_count);
        self.root.for_each_route(&mut |method, route| {
            out.push((method, route.pattern.as_str(), &route.value));
        });
        out
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// True if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<&'static str> {
        let mut router = Router::new();
        router.insert(Method::GET, "/users", "listUsers").unwrap();
        router.insert(Method::POST, "/users", "createUser").unwrap();
        router.insert(Method::GET, "/users/:id", "getUser").unwrap();
        router.insert(Method::DELETE, "/users/{user}", "deleteUser").unwrap();
        router.insert(Method::GET, "/files/*path", "serveFile").unwrap();
        router
    }

    fn found<'a>(lookup: Lookup<'a, &'static str>) -> RouteMatch<'a, &'static str> {
        match lookup {
            Lookup::Found(m) => m,
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_method_routing() {
        let router = router();
        assert_eq!(*found(router.lookup(&Method::GET, "/users")).value, "listUsers");
        assert_eq!(*found(router.lookup(&Method::POST, "/users")).value, "createUser");
        assert_eq!(router.len(), 5);
    }

    #[test]
    fn test_param_names_are_per_route() {
        let router = router();
        let get = found(router.lookup(&Method::GET, "/users/7"));
        assert_eq!(get.params.get("id"), Some("7"));
        assert_eq!(get.pattern, "/users/:id");

        let delete = found(router.lookup(&Method::DELETE, "/users/7"));
        assert_eq!(delete.params.get("user"), Some("7"));
        assert_eq!(delete.params.get("id"), None);
    }

    #[test]
    fn test_wildcard() {
        let router = router();
        let m = found(router.lookup(&Method::GET, "/files/img/logo.png"));
        assert_eq!(m.params.get("path"), Some("img/logo.png"));
    }

    #[test]
    fn test_method_not_allowed() {
        let router = router();
        match router.lookup(&Method::PUT, "/users") {
            Lookup::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        assert!(matches!(router().lookup(&Method::GET, "/posts"), Lookup::NotFound));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert_eq!(*found(router().lookup(&Method::GET, "/users/")).value, "listUsers");
    }

    #[test]
    fn test_conflict() {
        let mut router = router();
        let err = router.insert(Method::GET, "/users/{other}", "dup").unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
    }

    #[test]
    fn test_invalid_patterns() {
        let mut router = Router::new();
        assert_eq!(
            router.insert(Method::GET, "/a/*rest/b", ()),
            Err(RouteError::WildcardNotLast("/a/*rest/b".into()))
        );
        assert_eq!(
            router.insert(Method::GET, "/a/:", ()),
            Err(RouteError::UnnamedParam("/a/:".into()))
        );
    }

    #[test]
    fn test_routes_lists_everything() {
        let router = router();
        let mut patterns: Vec<_> = router
            .routes()
            .into_iter()
            .map(|(m, p, _)| format!("{m} {p}"))
            .collect();
        patterns.sort();
        assert_eq!(
            patterns,
            [
                "DELETE /users/{user}",
                "GET /files/*path",
                "GET /users",
                "GET /users/:id",
                "POST /users",
            ]
        );
    }
}
