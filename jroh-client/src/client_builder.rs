//! Client builder for configuring transport and observability
//!
//! The `ClientBuilder` provides a fluent API for configuring the client
//! before first use. It allows you to:
//! - Swap the HTTP transport
//! - Configure observability (OpenTelemetry)
//! - Set service name for telemetry
//!
//! # Examples
//!
//! ```rust,no_run
//! use jroh_client::{ClientBuilder, ReqwestTransport};
//! use std::sync::Arc;
//!
//! # fn example() -> jroh_core::Result<()> {
//! let http = reqwest::Client::builder()
//!     .user_agent("greeter/1.0")
//!     .build()
//!     .expect("reqwest client");
//!
//! let client = ClientBuilder::new("http://localhost:8080/rpc")
//!     .transport(Arc::new(ReqwestTransport::with_client(http)))
//!     .with_default_observability()
//!     .service_name("greeter-client")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::transport::{ReqwestTransport, Transport};
use crate::{ClientMetrics, JrohClient};
use jroh_core::{Error, Result};
use std::sync::Arc;

/// Builder for configuring and creating a JrohClient
pub struct ClientBuilder {
    url: String,
    transport: Option<Arc<dyn Transport>>,
    observability_config: Option<jroh_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    /// Create a new client builder for the endpoint at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport: None,
            observability_config: None,
            service_name: None,
        }
    }

    /// Use a custom transport instead of the default reqwest one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: jroh_core::ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(jroh_core::ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Fails if the URL is empty or observability cannot be initialized.
    pub fn build(self) -> Result<JrohClient> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidRequest("Endpoint URL is empty".to_string()));
        }

        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jroh_core::init_observability(config.clone()).map_err(|e| {
                Error::Internal(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(ClientMetrics::new(config.service_name)))
        } else {
            None
        };

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        tracing::debug!(url = %self.url, observability = metrics.is_some(), "Client built");

        Ok(JrohClient::from_parts(self.url, transport, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = ClientBuilder::new("http://localhost:8080/rpc").build().unwrap();
        assert_eq!(client.url(), "http://localhost:8080/rpc");
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn test_builder_rejects_empty_url() {
        let err = ClientBuilder::new("  ").build().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
