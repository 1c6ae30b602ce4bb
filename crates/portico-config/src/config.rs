//! The top-level [`PorticoConfig`].

use std::net::SocketAddr;

use portico_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DocsSection, ServerSection};

/// Complete service configuration.
///
/// ```toml
/// [server]
/// http_addr = "127.0.0.1:3000"
/// base_url = "/api"
///
/// [docs]
/// title = "Users"
///
/// [logging]
/// level = "debug"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PorticoConfig {
    /// Listener and request limits.
    #[serde(default)]
    pub server: ServerSection,

    /// Documentation endpoints.
    #[serde(default)]
    pub docs: DocsSection,

    /// Log output.
    #[serde(default)]
    pub logging: LogConfig,
}

impl PorticoConfig {
    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than 0",
            ));
        }

        let base_url = &self.server.base_url;
        if !base_url.is_empty() && (!base_url.starts_with('/') || base_url.ends_with('/')) {
            return Err(ConfigError::invalid_value(
                "server.base_url",
                format!("must start with '/' and not end with '/': {base_url}"),
            ));
        }

        if self.docs.enabled && !self.docs.path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.path",
                format!("must start with '/': {}", self.docs.path),
            ));
        }

        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Debug logging in the pretty format.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// JSON logging, docs still enabled.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Request timeout as a [`Duration`](std::time::Duration).
    #[must_use]
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.server.request_timeout_ms)
    }
}
