//! Server builder for constructing JSON-RPC servers
//!
//! The builder provides a fluent API for configuring and creating a
//! `JrohServer`. It allows you to:
//! - Set the bind address and the endpoint path
//! - Register direct and deferred method handlers
//! - Enable observability
//!
//! # Examples
//!
//! ```rust,no_run
//! use jroh_server::{from_sync_fn, from_typed_fn, lazy, JrohServer, RequestContext};
//!
//! # async fn example() -> jroh_core::Result<()> {
//! let server = JrohServer::builder()
//!     .bind_str("127.0.0.1:8080")?
//!     .path("/rpc")
//!     .handler("hello", from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
//!         Ok(format!("hello, {}!", name))
//!     }))
//!     .lazy_handler("goodbye", lazy(|| async {
//!         Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye")))
//!     }))
//!     .with_default_observability()
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::http::{rpc_router, DEFAULT_RPC_PATH};
use crate::{Dispatcher, Handler, JrohServer, LazyHandler, Router, ServerMetrics};
use jroh_core::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for constructing a JSON-RPC server
pub struct ServerBuilder {
    addr: Option<SocketAddr>,
    path: String,
    router: Router,
    observability_config: Option<jroh_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            addr: None,
            path: DEFAULT_RPC_PATH.to_string(),
            router: Router::new(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Set the bind address for the server
    ///
    /// Port 0 picks a free port; read it back with `JrohServer::local_addr`.
    pub fn bind(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Set the bind address from a string (e.g., "127.0.0.1:8080")
    pub fn bind_str(mut self, addr: &str) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("Invalid address: {}", e)))?;
        self.addr = Some(addr);
        Ok(self)
    }

    /// Set the path the endpoint answers on (default `/rpc`)
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Register a handler for a method
    pub fn handler(mut self, method: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        self.router.register(method, handler);
        self
    }

    /// Register a deferred handler for a method
    pub fn lazy_handler(mut self, method: impl Into<String>, handler: LazyHandler) -> Self {
        self.router.register_lazy(method, handler);
        self
    }

    /// Set the router (replaces any previously registered handlers)
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
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

    /// Bind the listener and assemble the server
    ///
    /// # Errors
    ///
    /// Fails if no address was set, the path does not start with `/`, the
    /// listener cannot bind, or observability cannot be initialized.
    pub async fn build(self) -> Result<JrohServer> {
        let addr = self
            .addr
            .ok_or_else(|| Error::InvalidRequest("No bind address specified".to_string()))?;

        if !self.path.starts_with('/') {
            return Err(Error::InvalidRequest(format!(
                "Endpoint path must start with '/': {}",
                self.path
            )));
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Io(e.to_string()))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| Error::Io(e.to_string()))?;

        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jroh_core::init_observability(config.clone()).map_err(|e| {
                Error::Internal(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(ServerMetrics::new(config.service_name)))
        } else {
            None
        };

        let mut dispatcher = Dispatcher::new(self.router);
        if let Some(metrics) = metrics {
            dispatcher = dispatcher.with_metrics(metrics);
        }

        tracing::info!(
            addr = %local_addr,
            path = %self.path,
            methods = ?dispatcher.router().methods(),
            "Server listening"
        );

        Ok(JrohServer {
            listener,
            local_addr,
            app: rpc_router(dispatcher.clone(), &self.path),
            dispatcher,
            path: self.path,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
