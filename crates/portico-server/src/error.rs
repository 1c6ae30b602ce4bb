//! Server error types.

use thiserror::Error;

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("Failed to bind: {0}")]
    BindError(String),

    /// An I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
