//! Typed client for the greeter server
//!
//! Start `greeter_server` first, then run
//! `cargo run --example greeter_client -- [name]`.

use jroh::{JrohClient, Result};

#[jroh::rpc_client]
pub trait Greeter {
    async fn hello(name: String) -> Result<String>;
    async fn goodbye() -> Result<String>;
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    jroh::core::init_logging("warn")?;

    let name = std::env::args().nth(1).unwrap_or_else(|| "pete".to_string());
    let greeter = GreeterClient::connect("http://127.0.0.1:8080/rpc");

    println!("{}", greeter.hello(name).await?);
    println!("{}", greeter.goodbye().await?);

    // The untyped client reaches the same methods by name
    let client: &JrohClient = greeter.client();
    match client.call::<_, String>("_internal", ()).await {
        Ok(value) => println!("unexpected: {}", value),
        Err(e) => println!("rejected: {}", e),
    }

    Ok(())
}
