//! Core JSON-RPC 2.0 envelopes, errors and codec for jroh
//!
//! This crate holds everything the server and the client agree on:
//!
//! - **Types**: the request and response envelopes and their ids
//! - **Codec**: JSON encoding/decoding with jroh error mapping
//! - **Error handling**: the shared error enum and the wire error data
//! - **Observability**: `tracing` and OpenTelemetry bootstrap
//!
//! # Architecture
//!
//! The crate is transport-agnostic. `jroh-server` wraps it in an axum HTTP
//! endpoint and `jroh-client` posts envelopes through a pluggable transport,
//! but neither side shares memory with the other: the envelope defined here
//! is the whole contract.
//!
//! # Example
//!
//! ```rust
//! use jroh_core::{codec, Id, JsonRpcRequest};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("hello", vec![json!("pete")], Id::from("1"));
//! let json = codec::encode_request(&request).unwrap();
//!
//! let decoded = codec::decode_body(json.as_bytes()).unwrap();
//! assert_eq!(decoded["method"], "hello");
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, JsonRpcErrorData, Result, SERVER_ERROR_CODE};
pub use observability::{init_logging, init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{
    is_reserved_method, Id, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION,
    RESERVED_METHOD_PREFIX,
};
