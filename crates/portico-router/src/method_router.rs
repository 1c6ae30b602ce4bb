//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to route values for a single path.
///
/// ```rust
/// use portico_router::MethodRouter;
/// use http::Method;
///
/// let mut router = MethodRouter::new();
/// router.set(Method::GET, "listUsers");
/// router.set(Method::POST, "createUser");
///
/// assert_eq!(router.get(&Method::GET), Some(&"listUsers"));
/// assert_eq!(router.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` for `method`, returning the previous value.
    pub fn set(&mut self, method: Method, value: T) -> Option<T> {
        if let Some(slot) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((method, value));
        None
    }

    /// Returns the value for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// True if `method` is registered.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.get(method).is_some()
    }

    /// Registered methods in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.entries.iter().map(|(m, _)| m)
    }

    /// Iterates over `(method, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> {
        self.entries.iter().map(|(m, v)| (m, v))
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `Allow` header value for this path.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.methods()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces() {
        let mut router = MethodRouter::new();
        assert_eq!(router.set(Method::GET, 1), None);
        assert_eq!(router.set(Method::GET, 2), Some(1));
        assert_eq!(router.get(&Method::GET), Some(&2));
    }

    #[test]
    fn test_extension_methods() {
        let mut router = MethodRouter::new();
        let purge = Method::from_bytes(b"PURGE").unwrap();
        router.set(purge.clone(), "purge");
        assert!(router.contains(&purge));
        assert!(!router.contains(&Method::GET));
    }

    #[test]
    fn test_allow_header() {
        let mut router = MethodRouter::new();
        router.set(Method::GET, ());
        router.set(Method::POST, ());
        assert_eq!(router.allow_header(), "GET, POST");
    }
}
