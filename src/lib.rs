//! JROH - JSON-RPC 2.0 Over HTTP
//!
//! This is the main convenience crate that re-exports all JROH sub-crates.
//! Use this crate if you want a single dependency that provides both client
//! and server functionality.
//!
//! # Architecture
//!
//! JROH is organized into modular crates:
//!
//! - **jroh-core**: Envelopes, codec, error handling, observability
//! - **jroh-server**: Dispatcher with lazy handlers, served over axum
//! - **jroh-client**: Remote proxy with id correlation over reqwest
//! - **jroh-macros**: `#[handler]` and `#[rpc_client]`
//!
//! # Quick Start - Server
//!
//! ```rust,no_run
//! use jroh::server::{from_sync_fn, from_typed_fn, lazy, RequestContext};
//! use jroh::JrohServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = JrohServer::builder()
//!         .bind_str("127.0.0.1:8080")?
//!         .handler("hello", from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
//!             Ok(format!("hello, {}!", name))
//!         }))
//!         .lazy_handler("goodbye", lazy(|| async {
//!             Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye")))
//!         }))
//!         .build()
//!         .await?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Client
//!
//! ```rust,no_run
//! use jroh::JrohClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrohClient::new("http://localhost:8080/rpc");
//!
//!     let greeting: String = client.call("hello", ("pete",)).await?;
//!     println!("Result: {}", greeting);
//!
//!     Ok(())
//! }
//! ```

pub use jroh_client as client;
pub use jroh_core as core;
pub use jroh_macros as macros;
pub use jroh_server as server;

pub use jroh_client::JrohClient;
pub use jroh_core::{Error, Result};
pub use jroh_macros::{handler, rpc_client};
pub use jroh_server::JrohServer;
