//! Handler traits and constructors for JSON-RPC methods
//!
//! A handler receives the ambient [`RequestContext`] followed by the
//! request's positional params and produces a JSON result.
//!
//! # Creating Handlers
//!
//! 1. **from_fn**: async closure over the raw `Vec<Value>` params
//! 2. **from_typed_fn**: async closure with typed positional arguments
//! 3. **from_sync_fn**: like `from_typed_fn`, for handlers that return a
//!    value directly instead of a future
//! 4. **#[handler] macro**: annotate an `async fn` (via jroh-macros)
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_fn, from_typed_fn, RequestContext};
//!
//! let echo = from_fn(|_ctx, params| async move { Ok(serde_json::Value::Array(params)) });
//!
//! let hello = from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
//!     Ok(format!("hello, {}!", name))
//! });
//! ```

use crate::context::RequestContext;
use crate::params::FromParams;
use jroh_core::{Error, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by every handler
pub type HandlerResult = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Trait for JSON-RPC method handlers
///
/// Handlers are shared across concurrently running requests, hence
/// `Send + Sync`. Returned errors become error envelopes whose message is
/// the error's `Display` text.
pub trait Handler: Send + Sync {
    /// Invoke the method with the request context and positional params
    fn handle(&self, ctx: RequestContext, params: Vec<Value>) -> HandlerResult;
}

/// Adapter from an async function to [`Handler`]
pub struct AsyncHandler<F, Fut>
where
    F: Fn(RequestContext, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    func: F,
}

impl<F, Fut> AsyncHandler<F, Fut>
where
    F: Fn(RequestContext, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    /// Wrap an async function
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Handler for AsyncHandler<F, Fut>
where
    F: Fn(RequestContext, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    fn handle(&self, ctx: RequestContext, params: Vec<Value>) -> HandlerResult {
        Box::pin((self.func)(ctx, params))
    }
}

/// Create a handler from an async function over raw params
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(RequestContext, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Box::new(AsyncHandler::new(func))
}

/// Create a handler with typed positional arguments
///
/// `P` is usually a tuple, one field per positional param (see
/// [`FromParams`]). The result is serialized back to JSON.
///
/// # Errors
///
/// - params that do not fit `P`: `Error::InvalidParams`
/// - a result that cannot be serialized: `Error::Serialization`
/// - errors returned by `func` pass through unchanged
///
/// # Examples
///
/// ```rust
/// use jroh_server::{from_typed_fn, RequestContext};
///
/// let add = from_typed_fn(|_ctx: RequestContext, (a, b): (i64, i64)| async move {
///     Ok(a + b)
/// });
/// ```
pub fn from_typed_fn<P, R, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: FromParams + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(RequestContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let func = Arc::new(func);

    from_fn(move |ctx: RequestContext, params: Vec<Value>| {
        let func = Arc::clone(&func);
        async move {
            let args = P::from_params(params)?;
            let result = func(ctx, args).await?;
            serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
        }
    })
}

/// Create a handler from a function that returns its value directly
///
/// ```rust
/// use jroh_server::{from_sync_fn, RequestContext};
///
/// let hello = from_sync_fn(|_ctx: RequestContext, (name,): (String,)| {
///     Ok(format!("hello, {}!", name))
/// });
/// ```
pub fn from_sync_fn<P, R, F>(func: F) -> Box<dyn Handler>
where
    P: FromParams + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(RequestContext, P) -> Result<R> + Send + Sync + 'static,
{
    let func = Arc::new(func);

    from_fn(move |ctx: RequestContext, params: Vec<Value>| {
        let func = Arc::clone(&func);
        async move {
            let args = P::from_params(params)?;
            let result = func(ctx, args)?;
            serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
        }
    })
}
