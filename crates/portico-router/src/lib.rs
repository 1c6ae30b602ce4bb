//! Segment tree router for Portico.
//!
//! Routes map a method and a path pattern to a value of any type. Lookup
//! distinguishes a full match, a path that exists under other methods
//! (405) and no match at all (404).
//!
//! ```text
//!                (root)
//!                  │
//!          ┌───────┴───────┐
//!        "users"        "files"
//!          │               │
//!    [GET,POST]          "*"
//!          │               │
//!        "{}"            [GET]
//!          │
//!    [GET,DELETE]
//! ```

mod method_router;
mod node;
mod params;
mod router;

pub use method_router::MethodRouter;
pub use node::{Route, Segment};
pub use params::Params;
pub use router::{Lookup, RouteError, RouteMatch, Router};

/// Renders a route pattern in OpenAPI form: `:id` and `*path` become
/// `{id}` and `{path}`.
///
/// ```rust
/// assert_eq!(portico_router::to_openapi_path("/users/:id/files/*rest"), "/users/{id}/files/{rest}");
/// assert_eq!(portico_router::to_openapi_path("/"), "/");
/// ```
#[must_use]
pub fn to_openapi_path(pattern: &str) -> String {
    let rendered: Vec<String> = pattern
        .split('/')
        .map(|segment| match Segment::parse(segment) {
            Segment::Param(name) | Segment::Wildcard(name) if !segment.is_empty() => {
                format!("{{{name}}}")
            }
            _ => segment.to_string(),
        })
        .collect();
    rendered.join("/")
}

/// Joins a prefix and a path with exactly one slash between them. The
/// result always starts with `/`.
///
/// ```rust
/// assert_eq!(portico_router::join_path("/api/", "/users"), "/api/users");
/// assert_eq!(portico_router::join_path("", "users"), "/users");
/// assert_eq!(portico_router::join_path("api", ""), "/api");
/// ```
#[must_use]
pub fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => format!("/{prefix}"),
        (false, false) => format!("/{prefix}/{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_openapi_path() {
        assert_eq!(to_openapi_path("/users/{id}"), "/users/{id}");
        assert_eq!(to_openapi_path("/orgs/:org/users/:id"), "/orgs/{org}/users/{id}");
        assert_eq!(to_openapi_path("/static/*file"), "/static/{file}");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/v1", "/users/:id"), "/v1/users/:id");
        assert_eq!(join_path("/", "/"), "/");
        assert_eq!(join_path("", ""), "/");
        assert_eq!(join_path("a", ""), "/a");
        assert_eq!(join_path("a/", "b"), "/a/b");
        assert_eq!(join_path("//a", "b/"), "/a/b/");
    }
}
