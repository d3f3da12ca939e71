//! JSON-RPC 2.0 client over HTTP
//!
//! This crate presents the methods of a remote jroh server as local async
//! calls. Each call is one HTTP POST carrying one request envelope.
//!
//! # Core Features
//!
//! - **Open-ended Methods**: `client.method(name)` for any method name
//! - **Typed Calls**: tuples in, `DeserializeOwned` results out
//! - **Correlation**: every response must echo its request's id
//! - **Pluggable Transport**: reqwest by default, any [`Transport`] otherwise
//! - **Observability**: OpenTelemetry integration for traces and metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jroh_client::JrohClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrohClient::new("http://localhost:8080/rpc");
//!
//!     let greeting: String = client.call("hello", ("pete",)).await?;
//!     println!("{}", greeting);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Typed Proxies
//!
//! With the `jroh-macros` crate, `#[rpc_client]` turns a trait of method
//! signatures into a client struct whose methods have exactly those
//! signatures, wrapped in `jroh_core::Result`.

mod client;
mod client_builder;
mod metrics;
mod params;
mod request;
mod transport;

pub use client::{JrohClient, RemoteMethod};
pub use client_builder::ClientBuilder;
pub use metrics::ClientMetrics;
pub use params::IntoParams;
pub use request::{PendingCall, RequestManager};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, JSON_CONTENT_TYPE};
