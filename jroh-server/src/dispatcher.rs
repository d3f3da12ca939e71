//! Request validation and dispatch
//!
//! The dispatcher takes one request body, checks its envelope, resolves the
//! handler from the [`Router`] and turns the outcome into exactly one
//! response envelope. It knows nothing about HTTP; the transport hands it a
//! [`RequestContext`] and the raw body.
//!
//! # Validation Order
//!
//! 1. body is a JSON object (arrays are batches, which are not supported)
//! 2. `jsonrpc` is `"2.0"`
//! 3. `method` is a string outside the reserved `_` namespace
//! 4. `method` is registered
//! 5. `params` is an array
//!
//! Any failure, including one raised by the handler or a panic inside it,
//! becomes an error envelope with code `-32001` and the error's text as
//! message. The request id is echoed whenever it can be recovered.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, Dispatcher, RequestContext, Router};
//! use serde_json::json;
//!
//! # async fn example() {
//! let mut router = Router::new();
//! router.register("hello", from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
//!     Ok(format!("hello, {}!", name))
//! }));
//!
//! let dispatcher = Dispatcher::new(router);
//! let response = dispatcher
//!     .dispatch(
//!         RequestContext::new(),
//!         json!({"jsonrpc": "2.0", "method": "hello", "params": ["pete"], "id": "1"}),
//!     )
//!     .await;
//! assert_eq!(response.result, Some(json!("hello, pete!")));
//! # }
//! ```

use crate::context::RequestContext;
use crate::metrics::ServerMetrics;
use crate::router::{MethodEntry, Router};
use futures::FutureExt;
use jroh_core::{
    codec, is_reserved_method, Error, Id, JsonRpcErrorData, JsonRpcResponse, Result,
    JSONRPC_VERSION,
};
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Validates request envelopes and invokes the matching handler
#[derive(Clone)]
pub struct Dispatcher {
    router: Router,
    metrics: Option<Arc<ServerMetrics>>,
}

impl Dispatcher {
    /// Create a dispatcher over a method table
    pub fn new(router: Router) -> Self {
        Self {
            router,
            metrics: None,
        }
    }

    /// Record dispatch metrics
    pub fn with_metrics(mut self, metrics: Arc<ServerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The method table
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch a raw request body
    ///
    /// Bodies that are not valid JSON produce an error envelope without id.
    pub async fn dispatch_slice(&self, ctx: RequestContext, body: &[u8]) -> JsonRpcResponse {
        match codec::decode_body(body) {
            Ok(value) => self.dispatch(ctx, value).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected unparseable request body");
                if let Some(ref metrics) = self.metrics {
                    metrics.record_error(e.kind());
                }
                JsonRpcResponse::error(JsonRpcErrorData::from(&e), None)
            }
        }
    }

    /// Dispatch a parsed request body
    pub async fn dispatch(&self, ctx: RequestContext, body: Value) -> JsonRpcResponse {
        let id = body.get("id").and_then(Id::from_value);
        let method = body
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let span = tracing::debug_span!("jsonrpc.dispatch", method = %method, id = ?id);
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.process(ctx, body))
            .catch_unwind()
            .instrument(span.clone())
            .await
            .unwrap_or_else(|panic| Err(Error::Handler(panic_message(panic))));

        let _enter = span.enter();
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(result) => {
                tracing::debug!(elapsed_secs = elapsed, "Request succeeded");
                if let Some(ref metrics) = self.metrics {
                    metrics.record_request(&method, "success", elapsed);
                }
                JsonRpcResponse::success(result, id)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Request failed");
                if let Some(ref metrics) = self.metrics {
                    metrics.record_request(&method, "error", elapsed);
                    metrics.record_error(e.kind());
                }
                JsonRpcResponse::error(JsonRpcErrorData::from(&e), id)
            }
        }
    }

    async fn process(&self, ctx: RequestContext, body: Value) -> Result<Value> {
        let mut envelope = into_object(body)?;

        match envelope.get("jsonrpc") {
            Some(Value::String(version)) if version == JSONRPC_VERSION => {}
            _ => {
                return Err(Error::InvalidRequest(
                    "jsonrpc version was not 2.0".to_string(),
                ))
            }
        }

        let method = match envelope.get("method") {
            Some(Value::String(method)) => method.clone(),
            _ => {
                return Err(Error::InvalidRequest(
                    "method must be a string".to_string(),
                ))
            }
        };

        if is_reserved_method(&method) {
            return Err(Error::ReservedMethod(method));
        }

        let entry = self
            .router
            .get(&method)
            .ok_or_else(|| Error::MethodNotFound(method.clone()))?;

        let params = match envelope.remove("params") {
            Some(Value::Array(params)) => params,
            _ => {
                return Err(Error::InvalidParams(
                    "params must be an array".to_string(),
                ))
            }
        };

        let handler = match entry {
            MethodEntry::Direct(handler) => handler,
            MethodEntry::Deferred(lazy) => {
                let (handler, produced) = lazy.resolve_tracked().await?;
                if produced {
                    tracing::info!(method = %method, "Resolved lazy handler");
                    if let Some(ref metrics) = self.metrics {
                        metrics.record_lazy_resolution(&method);
                    }
                }
                handler
            }
        };

        handler.handle(ctx, params).await
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(Error::InvalidRequest(
            "batch requests are not supported".to_string(),
        )),
        _ => Err(Error::InvalidRequest(
            "request body was not an object".to_string(),
        )),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".to_string()
    }
}
