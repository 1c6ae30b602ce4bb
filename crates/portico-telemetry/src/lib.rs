//! # Portico Telemetry
//!
//! Logging and metrics for Portico services.
//!
//! - **Logging**: [`init_logging`] installs a `tracing-subscriber` stack
//!   (env filter plus JSON or pretty output) from a [`LogConfig`]
//! - **Metrics**: request counters and latency histograms emitted through
//!   the `metrics` facade, see [`metrics`](crate::metrics)
//!
//! # Example
//!
//! ```rust,ignore
//! use portico_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::production())?;
//!     portico_telemetry::metrics::describe_metrics();
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use metrics::{record_request, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
