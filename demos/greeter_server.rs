//! Greeter server with one eager and one lazy method
//!
//! Run with `cargo run --example greeter_server`, then call it with the
//! `greeter_client` example or curl:
//!
//! ```text
//! curl -s localhost:8080/rpc -d '{"jsonrpc":"2.0","method":"hello","params":["pete"],"id":"1"}'
//! ```

use jroh::server::{lazy, RequestContext};
use jroh::{JrohServer, Result};
use std::time::Duration;

#[jroh::handler]
async fn hello(ctx: RequestContext, name: String) -> Result<String> {
    tracing::info!(remote = ?ctx.remote_addr, "Greeting {}", name);
    Ok(format!("hello, {}!", name))
}

#[jroh::handler]
async fn goodbye() -> Result<String> {
    Ok("goodbye".to_string())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    jroh::core::init_logging("info")?;

    let server = JrohServer::builder()
        .bind_str("127.0.0.1:8080")?
        .handler("hello", hello())
        .lazy_handler(
            "goodbye",
            lazy(|| async {
                // Stands in for loading something slow on first use
                tokio::time::sleep(Duration::from_millis(500)).await;
                tracing::info!("goodbye handler ready");
                Ok(goodbye())
            }),
        )
        .build()
        .await?;

    println!("Greeter listening on {}", server.url());
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
