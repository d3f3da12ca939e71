//! JSON-RPC 2.0 server over HTTP
//!
//! This crate routes JSON-RPC calls posted over HTTP to registered handler
//! functions. Each request body holds one call and gets exactly one
//! response envelope back.
//!
//! # Core Features
//!
//! - **Method Routing**: Register handlers under method names
//! - **Lazy Handlers**: Defer building a handler until its first call
//! - **Request Context**: Handlers see the caller's address and headers
//! - **Typed Params**: Positional params deserialized into tuples
//! - **Observability**: OpenTelemetry integration for traces and metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jroh_server::{from_typed_fn, JrohServer, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = JrohServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .handler("add", from_typed_fn(|_ctx: RequestContext, (a, b): (i64, i64)| async move {
//!             Ok(a + b)
//!         }))
//!         .build()
//!         .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **http**: axum endpoint that reads the body and writes the envelope
//! - **Dispatcher**: envelope validation, handler resolution, error framing
//! - **Router**: the method table, shared by every request
//!
//! The dispatcher is transport-agnostic and can be driven directly, which
//! is how the unit tests exercise it.

mod builder;
mod context;
mod dispatcher;
mod handler;
pub mod http;
mod lazy;
mod metrics;
mod params;
mod router;

pub use builder::ServerBuilder;
pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use handler::{from_fn, from_sync_fn, from_typed_fn, AsyncHandler, Handler, HandlerResult};
pub use lazy::{lazy, LazyHandler, Producer, ProducerResult};
pub use metrics::ServerMetrics;
pub use params::FromParams;
pub use router::{MethodEntry, Router, RouterBuilder};

use jroh_core::{Error, Result};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// JSON-RPC 2.0 server over HTTP
///
/// # Lifecycle
///
/// 1. **Build**: `JrohServer::builder()...build().await` binds the listener
/// 2. **Serve**: `run()`, `run_until(signal)` or `spawn()`
/// 3. **Shutdown**: resolve the signal, or call `ServerHandle::shutdown`
pub struct JrohServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: axum::Router,
    dispatcher: Dispatcher,
    path: String,
}

impl JrohServer {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Path the endpoint answers on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URL of the endpoint, for pointing a client at this server
    pub fn url(&self) -> String {
        format!("http://{}{}", self.local_addr, self.path)
    }

    /// The dispatcher serving requests
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve until an I/O error occurs
    #[tracing::instrument(skip(self), name = "server.run", fields(addr = %self.local_addr))]
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests
    #[tracing::instrument(skip(self, signal), name = "server.run_until", fields(addr = %self.local_addr))]
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Starting JROH server");

        axum::serve(
            self.listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| Error::Io(e.to_string()))?;

        tracing::info!("JROH server stopped");
        Ok(())
    }

    /// Serve on a background task
    pub fn spawn(self) -> ServerHandle {
        let local_addr = self.local_addr;
        let url = self.url();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(self.run_until(async move {
            let _ = shutdown_rx.await;
        }));

        ServerHandle {
            local_addr,
            url,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a server running on a background task
///
/// Dropping the handle also stops the server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Full URL of the endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop accepting connections and wait for the server task to finish
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        (&mut self.task)
            .await
            .map_err(|e| Error::Internal(format!("server task failed: {}", e)))?
    }
}
