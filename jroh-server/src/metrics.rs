//! Server metrics definitions
//!
//! OpenTelemetry instruments recorded by the dispatcher when observability
//! is enabled through `ServerBuilder::with_observability()`.
//!
//! # Metrics Collected
//!
//! - **requests_total**: JSON-RPC requests dispatched (counter)
//! - **request_duration**: dispatch latency distribution (histogram)
//! - **errors_total**: error envelopes produced, by error kind (counter)
//! - **lazy_resolutions_total**: deferred producers run (counter)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jroh_server::ServerMetrics;
//!
//! let metrics = ServerMetrics::new("greeter");
//! metrics.record_request("hello", "success", 0.002);
//! metrics.record_lazy_resolution("goodbye");
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Server metrics for monitoring
///
/// All metrics are prefixed with `jroh.server.*`.
pub struct ServerMetrics {
    /// Total number of requests dispatched
    pub requests_total: Counter<u64>,
    /// Dispatch duration in seconds
    pub request_duration: Histogram<f64>,
    /// Total number of error envelopes
    pub errors_total: Counter<u64>,
    /// Total number of deferred producer runs
    pub lazy_resolutions_total: Counter<u64>,
}

impl ServerMetrics {
    /// Create a new ServerMetrics instance on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ServerMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("jroh.server.requests.total")
                .with_description("Total number of requests dispatched")
                .build(),
            request_duration: meter
                .f64_histogram("jroh.server.request.duration")
                .with_description("Request dispatch duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("jroh.server.errors.total")
                .with_description("Total number of error responses")
                .build(),
            lazy_resolutions_total: meter
                .u64_counter("jroh.server.lazy_resolutions.total")
                .with_description("Total number of deferred handler producer runs")
                .build(),
        }
    }

    /// Record a dispatched request
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record an error envelope
    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }

    /// Record a deferred producer run
    pub fn record_lazy_resolution(&self, method: &str) {
        let attributes = &[KeyValue::new("method", method.to_string())];
        self.lazy_resolutions_total.add(1, attributes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::metrics::MeterProvider;
    use opentelemetry_sdk::metrics::SdkMeterProvider;

    #[test]
    fn test_metrics_creation() {
        let metrics = ServerMetrics::new("test-server");

        metrics.record_request("hello", "success", 0.1);
        metrics.record_request("hello", "error", 0.01);
        metrics.record_error("method_not_found");
        metrics.record_lazy_resolution("goodbye");
    }

    #[test]
    fn test_metrics_with_sdk_meter() {
        let provider = SdkMeterProvider::builder().build();
        let meter = provider.meter("jroh-server-test");
        let metrics = ServerMetrics::new_with_meter(&meter);

        metrics.record_request("goodbye", "success", 0.05);
        metrics.record_lazy_resolution("goodbye");
        metrics.record_error("handler");
    }
}
