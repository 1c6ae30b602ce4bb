//! Request metrics.
//!
//! Metrics are emitted through the [`metrics`] facade. Nothing is exported
//! unless the application installs a recorder.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `portico_http_requests_total` | Counter | `method`, `route`, `status` |
//! | `portico_http_request_duration_seconds` | Histogram | `method`, `route` |
//! | `portico_http_requests_in_flight` | Gauge | - |
//! | `portico_validation_failures_total` | Counter | `location` |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Completed requests.
pub const REQUESTS_TOTAL: &str = "portico_http_requests_total";

/// Request latency.
pub const REQUEST_DURATION_SECONDS: &str = "portico_http_request_duration_seconds";

/// Requests currently being handled.
pub const REQUESTS_IN_FLIGHT: &str = "portico_http_requests_in_flight";

/// Requests rejected by input validation.
pub const VALIDATION_FAILURES_TOTAL: &str = "portico_validation_failures_total";

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "<unmatched>";

/// Registers descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests processed");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        REQUESTS_IN_FLIGHT,
        "Number of HTTP requests currently being processed"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total requests rejected by validation, by location"
    );
}

/// Records one completed request.
pub fn record_request(method: &str, route: &str, status: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a validation failure at `location`.
pub fn record_validation_failure(location: &str) {
    counter!(VALIDATION_FAILURES_TOTAL, "location" => location.to_string()).increment(1);
}

/// Tracks one in-flight request for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(REQUESTS_IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}
