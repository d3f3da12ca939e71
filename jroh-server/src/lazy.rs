//! Deferred handlers resolved on first use
//!
//! A [`LazyHandler`] wraps a zero-argument producer that builds the real
//! handler. The producer runs the first time the method is called, and at
//! most once: its outcome is kept for the lifetime of the router and shared
//! by every clone.
//!
//! # Concurrency
//!
//! Resolution goes through [`tokio::sync::OnceCell::get_or_init`]:
//!
//! - concurrent first calls wait on the single running producer and reuse
//!   its handler
//! - a producer that fails has its error stored, so every later call gets
//!   the same error without running the producer again
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_sync_fn, lazy, RequestContext};
//!
//! let goodbye = lazy(|| async {
//!     // expensive setup would go here
//!     Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye")))
//! });
//! assert!(!goodbye.is_resolved());
//! ```

use crate::context::RequestContext;
use crate::handler::{Handler, HandlerResult};
use jroh_core::{Error, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Future returned by a [`Producer`]
pub type ProducerResult = Pin<Box<dyn Future<Output = Result<Box<dyn Handler>>> + Send>>;

/// Zero-argument factory for a handler
pub trait Producer: Send + Sync {
    /// Build the handler
    fn produce(&self) -> ProducerResult;
}

struct FnProducer<F> {
    func: F,
}

impl<F, Fut> Producer for FnProducer<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Box<dyn Handler>>> + Send + 'static,
{
    fn produce(&self) -> ProducerResult {
        Box::pin((self.func)())
    }
}

/// A handler produced on demand and memoized afterwards
#[derive(Clone)]
pub struct LazyHandler {
    producer: Arc<dyn Producer>,
    cell: Arc<OnceCell<std::result::Result<Arc<dyn Handler>, Error>>>,
}

impl LazyHandler {
    /// Wrap a producer
    pub fn new(producer: Arc<dyn Producer>) -> Self {
        Self {
            producer,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Whether the producer has already run, successfully or not
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }

    /// Get the handler, running the producer if it never ran
    ///
    /// A producer failure is returned here and on every later call.
    pub async fn resolve(&self) -> Result<Arc<dyn Handler>> {
        self.resolve_tracked().await.map(|(handler, _)| handler)
    }

    /// Like [`resolve`](Self::resolve), also reporting whether this call
    /// was the one that ran the producer
    pub async fn resolve_tracked(&self) -> Result<(Arc<dyn Handler>, bool)> {
        let produced = AtomicBool::new(false);
        let flag = &produced;
        let producer = &self.producer;
        let outcome = self
            .cell
            .get_or_init(|| async move {
                flag.store(true, Ordering::Relaxed);
                tracing::debug!("Running lazy handler producer");
                producer.produce().await.map(Arc::<dyn Handler>::from)
            })
            .await;
        let handler = outcome.clone()?;
        Ok((handler, produced.into_inner()))
    }
}

impl Handler for LazyHandler {
    fn handle(&self, ctx: RequestContext, params: Vec<Value>) -> HandlerResult {
        let this = self.clone();
        Box::pin(async move {
            let handler = this.resolve().await?;
            handler.handle(ctx, params).await
        })
    }
}

/// Create a deferred handler from an async producer
pub fn lazy<F, Fut>(producer: F) -> LazyHandler
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Box<dyn Handler>>> + Send + 'static,
{
    LazyHandler::new(Arc::new(FnProducer { func: producer }))
}
