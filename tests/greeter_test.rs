//! End-to-end tests of the attribute macros against a live server

use async_trait::async_trait;
use jroh::client::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use jroh::server::{lazy, RequestContext};
use jroh::{Error, JrohClient, JrohServer, Result};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[jroh::rpc_client]
pub trait Greeter {
    /// Greets the caller by name
    async fn hello(name: String) -> Result<String>;
    async fn goodbye() -> Result<String>;
    async fn add(a: i64, b: i64) -> Result<i64>;
    fn shout(text: String) -> impl Future<Output = String>;
    async fn whoami() -> Option<String>;
    async fn r#type() -> Result<String>;
    async fn missing() -> Result<()>;
}

#[jroh::handler]
async fn hello(name: String) -> Result<String> {
    Ok(format!("hello, {}!", name))
}

#[jroh::handler]
async fn goodbye() -> Result<String> {
    Ok("goodbye".to_string())
}

#[jroh::handler]
async fn add(_ctx: RequestContext, a: i64, b: i64) -> Result<i64> {
    a.checked_add(b)
        .ok_or_else(|| Error::handler("addition overflowed"))
}

#[jroh::handler]
async fn shout(text: String) -> Result<String> {
    Ok(text.to_uppercase())
}

#[jroh::handler]
async fn whoami(ctx: RequestContext) -> Result<Option<String>> {
    Ok(ctx.header("x-user").map(str::to_string))
}

#[jroh::handler]
async fn kind() -> Result<String> {
    Ok("greeter".to_string())
}

async fn serve(goodbye_builds: Arc<AtomicUsize>) -> jroh::server::ServerHandle {
    JrohServer::builder()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler("hello", hello())
        .handler("add", add())
        .handler("shout", shout())
        .handler("whoami", whoami())
        .handler("type", kind())
        .lazy_handler(
            "goodbye",
            lazy(move || {
                let builds = Arc::clone(&goodbye_builds);
                async move {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(goodbye())
                }
            }),
        )
        .build()
        .await
        .unwrap()
        .spawn()
}

#[test]
fn test_methods_are_listed_in_declaration_order() {
    assert_eq!(
        GreeterClient::METHODS,
        &["hello", "goodbye", "add", "shout", "whoami", "type", "missing"]
    );
}

#[tokio::test]
async fn test_typed_client_round_trip() {
    let builds = Arc::new(AtomicUsize::new(0));
    let server = serve(Arc::clone(&builds)).await;
    let greeter = GreeterClient::connect(server.url());

    assert_eq!(greeter.hello("pete".to_string()).await.unwrap(), "hello, pete!");
    assert_eq!(greeter.add(2, 40).await.unwrap(), 42);
    assert_eq!(greeter.shout("quiet".to_string()).await.unwrap(), "QUIET");
    assert_eq!(greeter.whoami().await.unwrap(), None);
    assert_eq!(greeter.r#type().await.unwrap(), "greeter");

    assert_eq!(builds.load(Ordering::SeqCst), 0);
    assert_eq!(greeter.goodbye().await.unwrap(), "goodbye");
    assert_eq!(greeter.goodbye().await.unwrap(), "goodbye");
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_handler_errors_surface_as_remote_errors() {
    let server = serve(Arc::new(AtomicUsize::new(0))).await;
    let greeter = GreeterClient::connect(server.url());

    let err = greeter.add(i64::MAX, 1).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(err.to_string(), "addition overflowed");

    let err = greeter.missing().await.unwrap_err();
    assert_eq!(err.to_string(), "method does not exist: missing");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_typed_and_untyped_clients_share_a_connection() {
    let server = serve(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());
    let greeter = GreeterClient::from(client.clone());

    let typed = greeter.hello("ann".to_string()).await.unwrap();
    let untyped: String = client.call("hello", ("ann",)).await.unwrap();
    assert_eq!(typed, untyped);
    assert_eq!(greeter.client().url(), server.url());

    server.shutdown().await.unwrap();
}

/// Records every envelope on its way to the real HTTP transport
struct Recording {
    inner: ReqwestTransport,
    bodies: Mutex<Vec<Value>>,
}

#[async_trait]
impl Transport for Recording {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse> {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        self.bodies.lock().unwrap().push(body);
        self.inner.post(request).await
    }
}

#[tokio::test]
async fn test_generated_methods_frame_positional_params() {
    let server = serve(Arc::new(AtomicUsize::new(0))).await;
    let recording = Arc::new(Recording {
        inner: ReqwestTransport::new(),
        bodies: Mutex::new(Vec::new()),
    });
    let greeter = GreeterClient::new(JrohClient::with_transport(
        server.url(),
        recording.clone(),
    ));

    greeter.add(1, 2).await.unwrap();
    greeter.goodbye().await.unwrap();
    greeter.r#type().await.unwrap();

    let bodies = recording.bodies.lock().unwrap();
    assert_eq!(bodies[0]["method"], "add");
    assert_eq!(bodies[0]["params"], serde_json::json!([1, 2]));
    assert_eq!(bodies[1]["method"], "goodbye");
    assert_eq!(bodies[1]["params"], serde_json::json!([]));
    assert_eq!(bodies[2]["method"], "type");

    server.shutdown().await.unwrap();
}
