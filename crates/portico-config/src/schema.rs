//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Listener and request limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Seconds to wait for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Per-request deadline in milliseconds, body read and handler included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Prefix for every route, e.g. `/api`.
    #[serde(default)]
    pub base_url: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            base_url: String::new(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

/// OpenAPI document and Swagger UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsSection {
    /// Serve the docs endpoints.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Mount point below the base URL.
    #[serde(default = "default_docs_path")]
    pub path: String,

    /// `info.title` of the document.
    #[serde(default = "default_title")]
    pub title: String,

    /// `info.version` of the document.
    #[serde(default = "default_version")]
    pub version: String,

    /// `info.description` of the document.
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_docs_path(),
            title: default_title(),
            version: default_version(),
            description: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_docs_path() -> String {
    "/docs".to_string()
}

fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}
