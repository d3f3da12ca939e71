//! Full client-server integration tests over a loopback socket

use jroh_client::JrohClient;
use jroh_core::{Error, SERVER_ERROR_CODE};
use jroh_server::{from_fn, from_sync_fn, from_typed_fn, lazy, JrohServer, RequestContext};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Sum {
    total: i64,
    terms: usize,
}

async fn greeter(producer_runs: Arc<AtomicUsize>) -> jroh_server::ServerHandle {
    JrohServer::builder()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .handler(
            "hello",
            from_typed_fn(|_ctx: RequestContext, (name,): (String,)| async move {
                Ok(format!("hello, {}!", name))
            }),
        )
        .handler(
            "sum",
            from_typed_fn(|_ctx: RequestContext, (terms,): (Vec<i64>,)| async move {
                Ok(Sum {
                    total: terms.iter().sum(),
                    terms: terms.len(),
                })
            }),
        )
        .handler(
            "peer",
            from_fn(|ctx: RequestContext, _params| async move {
                Ok(serde_json::json!(ctx.remote_addr.map(|a| a.ip().to_string())))
            }),
        )
        .handler(
            "fail",
            from_fn(|_ctx, _params| async { Err(Error::handler("the handler said no")) }),
        )
        .lazy_handler(
            "goodbye",
            lazy(move || {
                let runs = Arc::clone(&producer_runs);
                async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(from_sync_fn(|_ctx: RequestContext, (): ()| Ok("goodbye")))
                }
            }),
        )
        .build()
        .await
        .unwrap()
        .spawn()
}

#[tokio::test]
async fn test_hello_round_trip() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let greeting: String = client.call("hello", ("pete",)).await.unwrap();
    assert_eq!(greeting, "hello, pete!");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_lazy_goodbye_round_trip() {
    let runs = Arc::new(AtomicUsize::new(0));
    let server = greeter(Arc::clone(&runs)).await;
    let client = JrohClient::new(server.url());

    let first: String = client.method("goodbye").call(()).await.unwrap();
    let second: String = client.method("goodbye").call(()).await.unwrap();

    assert_eq!(first, "goodbye");
    assert_eq!(second, "goodbye");
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_first_calls_run_producer_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let server = greeter(Arc::clone(&runs)).await;
    let client = JrohClient::new(server.url());

    let calls: Vec<_> = (0..24)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.call::<_, String>("goodbye", ()).await })
        })
        .collect();

    for call in calls {
        assert_eq!(call.await.unwrap().unwrap(), "goodbye");
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(client.pending_count(), 0);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_struct_result() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let sum: Sum = client.call("sum", (vec![1, 2, 3],)).await.unwrap();
    assert_eq!(sum, Sum { total: 6, terms: 3 });

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_handler_error_reaches_caller() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let err = client.call_raw("fail", vec![]).await.unwrap_err();
    match err {
        Error::JsonRpc(data) => {
            assert_eq!(data.code, SERVER_ERROR_CODE);
            assert!(data.message.contains("the handler said no"));
        }
        other => panic!("Expected remote error, got {other:?}"),
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_method_is_an_error() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let err = client.call::<_, String>("nonexistent", ()).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(err.to_string(), "method does not exist: nonexistent");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wrong_arity_is_an_error() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let err = client
        .call::<_, String>("hello", ("pete", "extra"))
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("invalid params:"));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_remote_addr_is_injected() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let client = JrohClient::new(server.url());

    let peer: Option<String> = client.call("peer", ()).await.unwrap();
    assert_eq!(peer.as_deref(), Some("127.0.0.1"));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_calls_fail_after_shutdown() {
    let server = greeter(Arc::new(AtomicUsize::new(0))).await;
    let url = server.url().to_string();
    server.shutdown().await.unwrap();

    let client = JrohClient::new(url);
    let err = client.call::<_, String>("hello", ("pete",)).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_custom_path() {
    let server = JrohServer::builder()
        .bind_str("127.0.0.1:0")
        .unwrap()
        .path("/api/v1/rpc")
        .handler(
            "ping",
            from_sync_fn(|_ctx: RequestContext, (): ()| Ok("pong")),
        )
        .build()
        .await
        .unwrap()
        .spawn();

    assert!(server.url().ends_with("/api/v1/rpc"));
    let client = JrohClient::new(server.url());
    let pong: String = client.call("ping", ()).await.unwrap();
    assert_eq!(pong, "pong");

    server.shutdown().await.unwrap();
}
