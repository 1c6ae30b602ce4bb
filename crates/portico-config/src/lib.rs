//! # Portico Config
//!
//! Typed, layered configuration for Portico services.
//!
//! ```rust,ignore
//! use portico_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("portico.toml")?
//!     .with_dotenv()
//!     .with_env_prefix("PORTICO")
//!     .load()?;
//!
//! portico_telemetry::init_logging(&config.logging)?;
//! ```
//!
//! Environment overrides use `__` between section and field:
//! `PORTICO_SERVER__HTTP_ADDR=127.0.0.1:3000`, `PORTICO_LOGGING__LEVEL=debug`.

#![doc(html_root_url = "https://docs.rs/portico-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PorticoConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DocsSection, ServerSection};

pub use portico_telemetry::{LogConfig, LogFormat};
