//! Outbound HTTP seam
//!
//! The client never talks to the network directly; it hands each framed
//! request to a [`Transport`]. [`ReqwestTransport`] is the default.
//! Tests and embedders can supply their own implementation to fake
//! responses, add headers or route through a different HTTP stack.
//!
//! # Examples
//!
//! ```rust
//! use async_trait::async_trait;
//! use jroh_client::{HttpRequest, HttpResponse, Transport};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn post(&self, _request: HttpRequest) -> jroh_core::Result<HttpResponse> {
//!         Ok(HttpResponse::new(200, r#"{"jsonrpc":"2.0","id":"1","result":true}"#))
//!     }
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use jroh_core::{Error, Result};
use serde_json::Value;

/// Content type of every request and response body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An outbound POST
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Target URL
    pub url: String,
    /// Value of the `Content-Type` header
    pub content_type: &'static str,
    /// Encoded request envelope
    pub body: Bytes,
}

impl HttpRequest {
    /// Create a JSON POST to `url`
    pub fn json(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            content_type: JSON_CONTENT_TYPE,
            body: body.into(),
        }
    }
}

/// The answer to an [`HttpRequest`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    ///
    /// The status code is not consulted; error envelopes arrive with 200
    /// and anything that is not JSON is a contract violation either way.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::ProtocolViolation(format!(
                "response body is not valid JSON (HTTP {}): {}",
                self.status, e
            ))
        })
    }
}

/// Sends framed requests to the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the request and return the server's answer
    ///
    /// Fail with `Error::Transport` when no answer was received.
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (proxies, TLS, default headers)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .client
            .post(&request.url)
            .header(reqwest::header::CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(200, r#"{"ok":true}"#);
        assert_eq!(response.json().unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_response_not_json() {
        let response = HttpResponse::new(502, "<html>bad gateway</html>");
        let err = response.json().unwrap_err();
        assert!(matches!(err, Error::ProtocolViolation(_)));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_request_is_json() {
        let request = HttpRequest::json("http://localhost/rpc", "{}");
        assert_eq!(request.content_type, "application/json");
        assert_eq!(request.body, Bytes::from_static(b"{}"));
    }
}
