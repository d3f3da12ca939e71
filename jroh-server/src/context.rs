//! Ambient per-request context handed to every handler
//!
//! The transport builds one `RequestContext` per HTTP request and passes it
//! as the first argument of the handler. Callers never send it over the
//! wire; it is how a handler learns who is calling and with which headers.

use axum::http::{HeaderMap, Uri};
use std::net::SocketAddr;

/// Information about the HTTP request that carried a JSON-RPC call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Peer address, when the server was started with connect info
    pub remote_addr: Option<SocketAddr>,
    /// Request URI as received (path and query)
    pub uri: Uri,
    /// HTTP request headers
    pub headers: HeaderMap,
}

impl RequestContext {
    /// Create an empty context
    ///
    /// Handy for invoking handlers and dispatchers outside of HTTP.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the peer address
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Set the request URI
    pub fn with_uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Set the request headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Look up a header as UTF-8 text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("x-caller", HeaderValue::from_static("tests"));

        let ctx = RequestContext::new().with_headers(headers);
        assert_eq!(ctx.header("x-caller"), Some("tests"));
        assert_eq!(ctx.header("x-missing"), None);
    }

    #[test]
    fn test_defaults() {
        let ctx = RequestContext::new();
        assert!(ctx.remote_addr.is_none());
        assert_eq!(ctx.uri.path(), "/");
    }
}
