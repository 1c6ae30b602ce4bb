//! Error types for document assembly.

use thiserror::Error;

/// Errors raised while building or serving an OpenAPI document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An operation already exists for this method and path.
    #[error("Duplicate operation {method} {path}")]
    DuplicateOperation {
        /// HTTP method.
        method: String,
        /// OpenAPI path template.
        path: String,
    },

    /// The method has no slot in an OpenAPI path item.
    #[error("Unsupported method {method} for {path}")]
    UnsupportedMethod {
        /// HTTP method.
        method: String,
        /// OpenAPI path template.
        path: String,
    },

    /// Path placeholders and declared path parameters disagree.
    #[error("Path parameters of {method} {path} do not match: missing {missing:?}, undeclared {undeclared:?}")]
    PathParameterMismatch {
        /// HTTP method.
        method: String,
        /// OpenAPI path template.
        path: String,
        /// Placeholders in the path with no declared parameter.
        missing: Vec<String>,
        /// Declared path parameters with no placeholder.
        undeclared: Vec<String>,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_duplicate_operation_error() {
        let err = DocsError::DuplicateOperation {
            method: "GET".to_string(),
            path: "/users/{id}".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate operation GET /users/{id}");
    }

    #[test]
    fn test_path_parameter_mismatch_error() {
        let err = DocsError::PathParameterMismatch {
            method: "GET".to_string(),
            path: "/users/{id}".to_string(),
            missing: vec!["id".to_string()],
            undeclared: vec![],
        };
        assert!(err.to_string().contains("missing [\"id\"]"));
    }
}
