//! Request cookies and `Set-Cookie` rendering.

use std::collections::HashMap;

use http::{header, HeaderMap};

/// Cookies sent with a request.
///
/// All `Cookie` headers are read. A name sent more than once keeps every
/// value in order.
///
/// ```rust
/// use portico_extract::Cookies;
/// use http::{header, HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("session=abc; theme=\"dark\""));
///
/// let cookies = Cookies::from_headers(&headers);
/// assert_eq!(cookies.get("session"), Some("abc"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, Vec<String>>,
}

impl Cookies {
    /// Parses the `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies: HashMap<String, Vec<String>> = HashMap::new();
        for value in headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    let value = value.trim().trim_matches('"');
                    cookies
                        .entry(name.to_string())
                        .or_default()
                        .push(value.to_string());
                }
            }
        }
        Self { cookies }
    }

    /// First value of a cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Every value of a cookie.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.cookies
            .get(name)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of distinct cookie names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// True if no cookies were sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Renders a `Set-Cookie` value from a cookie template.
///
/// The template is the cookie name followed by comma-separated attributes;
/// the value is placed after the name and attributes are joined with `;`.
///
/// ```rust
/// use portico_extract::render_set_cookie;
///
/// assert_eq!(render_set_cookie("session,Path=/,HttpOnly", "abc"), "session=abc;Path=/;HttpOnly");
/// assert_eq!(render_set_cookie("theme", "dark"), "theme=dark");
/// ```
#[must_use]
pub fn render_set_cookie(template: &str, value: &str) -> String {
    let mut parts = template.split(',');
    let name = parts.next().unwrap_or_default();
    let mut out = format!("{name}={value}");
    for attr in parts {
        out.push(';');
        out.push_str(attr);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_multiple_headers_and_repeats() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
        headers.append(header::COOKIE, HeaderValue::from_static("a=3"));

        let cookies = Cookies::from_headers(&headers);
        assert_eq!(cookies.get("a"), Some("1"));
        assert_eq!(cookies.get_all("a"), vec!["1", "3"]);
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("novalue; =x; ok=1"));

        let cookies = Cookies::from_headers(&headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("ok"), Some("1"));
    }

    #[test]
    fn test_value_with_equals() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=a=b"));
        assert_eq!(Cookies::from_headers(&headers).get("token"), Some("a=b"));
    }

    #[test]
    fn test_render_keeps_attribute_text() {
        assert_eq!(
            render_set_cookie("sid,Max-Age=60,Secure", "x"),
            "sid=x;Max-Age=60;Secure"
        );
    }
}
