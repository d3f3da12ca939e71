//! Method table for JSON-RPC dispatch
//!
//! The router maps method names to their handlers. An entry is either a
//! ready handler or a deferred producer that builds one on first use (see
//! [`LazyHandler`]).
//!
//! # Thread Safety
//!
//! Routers are cheaply cloneable (`Arc`-based). Clones share the table and
//! the memoized lazy handlers, so a producer runs once no matter how many
//! clones serve requests.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::{from_typed_fn, from_sync_fn, lazy, RequestContext, Router};
//!
//! let mut router = Router::new();
//!
//! router.register("hello", from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
//!     Ok(format!("hello, {}!", name))
//! }));
//!
//! router.register_lazy("goodbye", lazy(|| async {
//!     Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye")))
//! }));
//!
//! assert!(router.has_method("goodbye"));
//! ```

use crate::handler::Handler;
use crate::lazy::LazyHandler;
use jroh_core::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// One row of the method table
#[derive(Clone)]
pub enum MethodEntry {
    /// Handler available immediately
    Direct(Arc<dyn Handler>),
    /// Handler built by a producer on first use
    Deferred(LazyHandler),
}

impl MethodEntry {
    /// Whether the entry's producer has not run yet
    pub fn is_pending(&self) -> bool {
        match self {
            MethodEntry::Direct(_) => false,
            MethodEntry::Deferred(lazy) => !lazy.is_resolved(),
        }
    }
}

/// Router for JSON-RPC methods
#[derive(Clone, Default)]
pub struct Router {
    entries: Arc<HashMap<String, MethodEntry>>,
}

impl Router {
    /// Create a new empty router
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method
    ///
    /// Replaces any previous entry with the same name.
    pub fn register(&mut self, method: impl Into<String>, handler: Box<dyn Handler>) {
        self.insert(method.into(), MethodEntry::Direct(Arc::from(handler)));
    }

    /// Register a deferred handler for a method
    pub fn register_lazy(&mut self, method: impl Into<String>, handler: LazyHandler) {
        self.insert(method.into(), MethodEntry::Deferred(handler));
    }

    fn insert(&mut self, method: String, entry: MethodEntry) {
        let entries = Arc::make_mut(&mut self.entries);
        entries.insert(method, entry);
    }

    /// Get the entry for a method
    pub fn get(&self, method: &str) -> Option<MethodEntry> {
        self.entries.get(method).cloned()
    }

    /// Check if a method is registered
    pub fn has_method(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }

    /// Get all registered method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no method is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a method and resolve its handler, running a deferred
    /// producer if this is the first call
    pub async fn resolve(&self, method: &str) -> Result<Arc<dyn Handler>> {
        match self.get(method) {
            Some(MethodEntry::Direct(handler)) => Ok(handler),
            Some(MethodEntry::Deferred(lazy)) => lazy.resolve().await,
            None => Err(Error::MethodNotFound(method.to_string())),
        }
    }
}

/// Builder for constructing a router
#[derive(Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for a method
    pub fn handler(mut self, method: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        self.router.register(method, handler);
        self
    }

    /// Add a deferred handler for a method
    pub fn lazy_handler(mut self, method: impl Into<String>, handler: LazyHandler) -> Self {
        self.router.register_lazy(method, handler);
        self
    }

    /// Build the router
    pub fn build(self) -> Router {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::handler::{from_fn, from_sync_fn};
    use crate::lazy::lazy;
    use serde_json::json;

    #[tokio::test]
    async fn test_router_basic() {
        let mut router = Router::new();
        router.register(
            "test",
            from_fn(|_ctx, _params| async { Ok(json!({"status": "ok"})) }),
        );

        assert!(router.has_method("test"));
        assert!(!router.has_method("unknown"));

        let handler = router.resolve("test").await.unwrap();
        let result = handler.handle(RequestContext::new(), vec![]).await.unwrap();
        assert_eq!(result, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_router_method_not_found() {
        let router = Router::new();
        let err = router.resolve("unknown").await.err().unwrap();
        assert!(matches!(err, Error::MethodNotFound(ref m) if m == "unknown"));
    }

    #[tokio::test]
    async fn test_clones_share_lazy_resolution() {
        let router = RouterBuilder::new()
            .lazy_handler(
                "goodbye",
                lazy(|| async { Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye"))) }),
            )
            .build();
        let clone = router.clone();

        assert!(router.get("goodbye").unwrap().is_pending());
        clone.resolve("goodbye").await.unwrap();
        assert!(!router.get("goodbye").unwrap().is_pending());
    }

    #[test]
    fn test_methods_sorted() {
        let router = RouterBuilder::new()
            .handler("b", from_fn(|_ctx, _params| async { Ok(json!(null)) }))
            .handler("a", from_fn(|_ctx, _params| async { Ok(json!(null)) }))
            .build();

        assert_eq!(router.methods(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(router.len(), 2);
        assert!(!router.is_empty());
    }
}
