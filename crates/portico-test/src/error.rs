//! Test error types.

use thiserror::Error;

/// Errors from building test requests or decoding test responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// Request building failed.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed.
    #[error("Form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TestError::InvalidHeader("X Bad".into());
        assert_eq!(err.to_string(), "Invalid header: X Bad");

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(TestError::from(json).to_string().starts_with("JSON error:"));
    }
}
