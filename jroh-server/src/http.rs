//! HTTP transport over axum
//!
//! A single `POST` route feeds request bodies to the [`Dispatcher`]. The
//! endpoint never fails at the HTTP level: every outcome, error envelopes
//! included, is answered with status 200 and `Content-Type:
//! application/json`.
//!
//! Use [`rpc_router`] to mount the endpoint inside a larger axum app:
//!
//! ```rust
//! use jroh_server::{http::rpc_router, Dispatcher, Router};
//!
//! let app = axum::Router::new()
//!     .merge(rpc_router(Dispatcher::new(Router::new()), "/api/rpc"));
//! ```

use crate::context::RequestContext;
use crate::dispatcher::Dispatcher;
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
};
use bytes::Bytes;
use jroh_core::codec;
use std::net::SocketAddr;

/// Path the endpoint is mounted on unless configured otherwise
pub const DEFAULT_RPC_PATH: &str = "/rpc";

/// Emitted if an envelope cannot be encoded, which only happens on a bug
const ENCODE_FAILURE_BODY: &str =
    r#"{"jsonrpc":"2.0","code":-32001,"message":"internal error: response encoding failed"}"#;

/// Build an axum router serving JSON-RPC on `path`
pub fn rpc_router(dispatcher: Dispatcher, path: &str) -> axum::Router {
    axum::Router::new()
        .route(path, post(rpc_endpoint))
        .with_state(dispatcher)
}

async fn rpc_endpoint(
    State(dispatcher): State<Dispatcher>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut ctx = RequestContext::new().with_uri(uri).with_headers(headers);
    if let Some(ConnectInfo(addr)) = connect_info {
        ctx = ctx.with_remote_addr(addr);
    }

    let response = dispatcher.dispatch_slice(ctx, &body).await;
    let body = codec::encode_response(&response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode response envelope");
        ENCODE_FAILURE_BODY.to_string()
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
