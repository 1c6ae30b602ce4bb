//! Query strings and urlencoded bodies.

use std::collections::HashMap;

use portico_core::HttpError;

/// Multi-valued string map: every value sent for a key, in order.
pub type Values = HashMap<String, Vec<String>>;

/// Parses `a=1&b=2&a=3` into a multi-valued map.
///
/// ```rust
/// let values = portico_extract::parse_urlencoded("tag=a&tag=b&q=hello+world").unwrap();
/// assert_eq!(values["tag"], ["a", "b"]);
/// assert_eq!(values["q"], ["hello world"]);
/// ```
pub fn parse_urlencoded(input: &str) -> Result<Values, HttpError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    let mut values = Values::new();
    for (key, value) in pairs {
        values.entry(key).or_default().push(value);
    }
    Ok(values)
}
