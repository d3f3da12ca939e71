//! Client metrics definitions
//!
//! OpenTelemetry instruments recorded by the client when observability is
//! enabled via `ClientBuilder::with_observability()`.
//!
//! # Metrics Collected
//!
//! - **requests_total**: calls sent, by method and outcome (counter)
//! - **request_duration**: round-trip latency distribution (histogram)
//! - **errors_total**: failed calls, by error kind (counter)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jroh_client::ClientMetrics;
//!
//! let metrics = ClientMetrics::new("greeter-client");
//! metrics.record_request("hello", "success", 0.004);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Client metrics for monitoring
///
/// All metrics are prefixed with `jroh.client.*`.
pub struct ClientMetrics {
    /// Total number of requests sent
    pub requests_total: Counter<u64>,
    /// Request duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of errors
    pub errors_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create a new ClientMetrics instance
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ClientMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("jroh.client.requests.total")
                .with_description("Total number of requests sent")
                .build(),
            request_duration: meter
                .f64_histogram("jroh.client.request.duration")
                .with_description("Request round-trip duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("jroh.client.errors.total")
                .with_description("Total number of failed requests")
                .build(),
        }
    }

    /// Record a completed request
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record an error
    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }
}
