//! JSON-RPC remote proxy over HTTP
//!
//! This module provides [`JrohClient`], which turns local calls into
//! JSON-RPC requests posted to a single endpoint URL, and [`RemoteMethod`],
//! a callable bound to one method name.
//!
//! # Call Lifecycle
//!
//! 1. **Frame**: allocate the next id and build the request envelope
//! 2. **Post**: hand the encoded envelope to the transport
//! 3. **Correlate**: check the version and that the response echoes the id
//! 4. **Resolve**: return the result, or the server's error
//!
//! # Cloning
//!
//! `JrohClient` is cheaply cloneable using `Arc` internally. All clones
//! share the transport, the id counter and the pending-call registry.

use crate::metrics::ClientMetrics;
use crate::params::IntoParams;
use crate::request::RequestManager;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::ClientBuilder;
use jroh_core::{codec, Error, JsonRpcRequest, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

struct ClientInner {
    url: String,
    transport: Arc<dyn Transport>,
    request_manager: RequestManager,
    metrics: Option<Arc<ClientMetrics>>,
}

/// JSON-RPC client over HTTP
///
/// # Examples
///
/// ```rust,no_run
/// use jroh_client::JrohClient;
///
/// # async fn example() -> jroh_core::Result<()> {
/// let client = JrohClient::new("http://localhost:8080/rpc");
///
/// let greeting: String = client.call("hello", ("pete",)).await?;
/// assert_eq!(greeting, "hello, pete!");
///
/// let goodbye = client.method("goodbye");
/// let farewell: String = goodbye.call(()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JrohClient {
    inner: Arc<ClientInner>,
}

impl JrohClient {
    /// Create a client posting to `url` with the default reqwest transport
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_transport(url, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client posting to `url` through a custom transport
    pub fn with_transport(url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::from_parts(url.into(), transport, None)
    }

    /// Create a client builder
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    pub(crate) fn from_parts(
        url: String,
        transport: Arc<dyn Transport>,
        metrics: Option<Arc<ClientMetrics>>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                url,
                transport,
                request_manager: RequestManager::new(),
                metrics,
            }),
        }
    }

    /// Endpoint URL every call is posted to
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Number of calls currently awaiting a response
    pub fn pending_count(&self) -> usize {
        self.inner.request_manager.pending_count()
    }

    /// Get a callable for any method name
    ///
    /// No check is made that the server knows the method; an unknown name
    /// fails when called.
    pub fn method(&self, name: impl Into<String>) -> RemoteMethod {
        RemoteMethod {
            client: self.clone(),
            name: name.into(),
        }
    }

    /// Call a method and deserialize its result
    ///
    /// `params` is `()`, a tuple of serializable values, or a raw
    /// `Vec<Value>`; see [`IntoParams`].
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: IntoParams,
        R: DeserializeOwned,
    {
        let params = params.into_params()?;
        let result = self.call_raw(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            Error::Serialization(format!("cannot decode result of {}: {}", method, e))
        })
    }

    /// Call a method with raw positional params and return the raw result
    ///
    /// A missing or `null` result resolves to `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `Error::Transport`: the POST itself failed
    /// - `Error::ProtocolViolation`: the response is not a valid envelope for
    ///   this call (not JSON, wrong version, different id)
    /// - `Error::JsonRpc`: the server answered with an error envelope
    #[tracing::instrument(skip(self, params), name = "client.call", fields(method = %method))]
    pub async fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.exchange(method, params).await;
        let duration = start.elapsed().as_secs_f64();

        match &outcome {
            Ok(_) => {
                tracing::debug!(elapsed_secs = duration, "Call succeeded");
                if let Some(ref m) = self.inner.metrics {
                    m.record_request(method, "success", duration);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Call failed");
                if let Some(ref m) = self.inner.metrics {
                    m.record_request(method, "error", duration);
                    m.record_error(e.kind());
                }
            }
        }

        outcome
    }

    async fn exchange(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let manager = &self.inner.request_manager;
        let id = manager.next_id();
        let request = JsonRpcRequest::new(method, params, id.clone());
        let body = codec::encode_request(&request)?;

        let pending = manager.register(id);
        tracing::debug!(id = %pending.id(), "Request sent, waiting for response");

        let response = self
            .inner
            .transport
            .post(HttpRequest::json(self.inner.url.clone(), body))
            .await?;

        let envelope = codec::decode_response(response.json()?)?;
        pending.settle(envelope)
    }
}

impl std::fmt::Debug for JrohClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JrohClient")
            .field("url", &self.inner.url)
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// A remote method bound to a client
///
/// Obtained from [`JrohClient::method`]. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct RemoteMethod {
    client: JrohClient,
    name: String,
}

impl RemoteMethod {
    /// The method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the method and deserialize its result
    pub async fn call<P, R>(&self, params: P) -> Result<R>
    where
        P: IntoParams,
        R: DeserializeOwned,
    {
        self.client.call(&self.name, params).await
    }

    /// Call the method with raw positional params
    pub async fn call_raw(&self, params: Vec<Value>) -> Result<Value> {
        self.client.call_raw(&self.name, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every request with `respond(request_envelope)`
    struct EchoTransport<F> {
        respond: F,
        seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl<F> Transport for EchoTransport<F>
    where
        F: Fn(&Value) -> Value + Send + Sync,
    {
        async fn post(&self, request: HttpRequest) -> Result<HttpResponse> {
            let envelope: Value = serde_json::from_slice(&request.body).unwrap();
            let reply = (self.respond)(&envelope);
            self.seen.lock().unwrap().push(envelope);
            Ok(HttpResponse::new(200, reply.to_string()))
        }
    }

    fn client_with<F>(respond: F) -> (JrohClient, Arc<EchoTransport<F>>)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let transport = Arc::new(EchoTransport {
            respond,
            seen: Mutex::new(Vec::new()),
        });
        let client = JrohClient::with_transport("http://test/rpc", transport.clone());
        (client, transport)
    }

    #[tokio::test]
    async fn test_request_framing() {
        let (client, transport) =
            client_with(|req| json!({"jsonrpc": "2.0", "id": req["id"], "result": "ok"}));

        let _: String = client.call("hello", ("pete",)).await.unwrap();
        let _: String = client.method("goodbye").call(()).await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            json!({"jsonrpc": "2.0", "method": "hello", "params": ["pete"], "id": "1"})
        );
        assert_eq!(
            seen[1],
            json!({"jsonrpc": "2.0", "method": "goodbye", "params": [], "id": "2"})
        );
    }

    #[tokio::test]
    async fn test_null_result() {
        let (client, _) = client_with(|req| json!({"jsonrpc": "2.0", "id": req["id"]}));
        let value = client.call_raw("noop", vec![]).await.unwrap();
        assert_eq!(value, Value::Null);
        client.call::<_, ()>("noop", ()).await.unwrap();
    }

    #[tokio::test]
    async fn test_result_type_mismatch() {
        let (client, _) =
            client_with(|req| json!({"jsonrpc": "2.0", "id": req["id"], "result": "text"}));
        let err = client.call::<_, i64>("count", ()).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_pending_cleared_after_call() {
        let (client, _) = client_with(|req| json!({"jsonrpc": "2.0", "id": req["id"], "result": 1}));
        let _: i64 = client.call("one", ()).await.unwrap();
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn test_remote_method_name() {
        let client = JrohClient::new("http://localhost:1/rpc");
        assert_eq!(client.method("anything.at_all").name(), "anything.at_all");
        assert_eq!(client.url(), "http://localhost:1/rpc");
    }
}
