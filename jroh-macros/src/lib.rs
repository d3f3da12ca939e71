//! Procedural macros for the jroh JSON-RPC toolkit
//!
//! # Available Macros
//!
//! ## `#[handler]` - Server-side Handler Function
//!
//! Turns an `async fn` taking the request context and positional params into
//! a factory returning `Box<dyn jroh_server::Handler>`:
//!
//! ```ignore
//! use jroh_core::Result;
//! use jroh_server::RequestContext;
//!
//! #[jroh::handler]
//! async fn hello(ctx: RequestContext, name: String) -> Result<String> {
//!     Ok(format!("hello, {}!", name))
//! }
//!
//! let mut router = Router::new();
//! router.register("hello", hello());
//! ```
//!
//! ## `#[rpc_client]` - Typed Client Projection
//!
//! Turns a trait of remote method signatures into a `<Trait>Client` struct
//! with one async method per signature:
//!
//! ```ignore
//! #[jroh::rpc_client]
//! pub trait Greeter {
//!     async fn hello(name: String) -> Result<String>;
//!     async fn goodbye() -> Result<String>;
//! }
//!
//! let greeter = GreeterClient::connect("http://localhost:8080/rpc");
//! let greeting: String = greeter.hello("pete".into()).await?;
//! ```
//!
//! Both macros emit paths into `jroh_server`, `jroh_client` and `jroh_core`,
//! so the calling crate depends on those directly (or on `jroh`, which
//! re-exports them).

mod handler;
mod rpc_client;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn, ItemTrait};

/// Attribute macro for defining JSON-RPC handlers
///
/// # Generated Code
///
/// ```ignore
/// #[handler]
/// async fn add(ctx: RequestContext, a: i64, b: i64) -> Result<i64> {
///     Ok(a + b)
/// }
/// ```
///
/// becomes approximately:
///
/// ```ignore
/// fn add() -> Box<dyn Handler> {
///     async fn inner_handler(ctx: RequestContext, a: i64, b: i64) -> Result<i64> {
///         Ok(a + b)
///     }
///     from_typed_fn(|ctx, (a, b): (i64, i64)| inner_handler(ctx, a, b))
/// }
/// ```
///
/// # Parameters
///
/// - An optional first parameter of type `RequestContext` receives the
///   ambient context; it is never read from the request params.
/// - Every other parameter is one positional param, deserialized with serde.
///   At most eight are supported.
///
/// # Return Type
///
/// Must be `jroh_core::Result<T>` with `T: Serialize`.
///
/// # Limitations
///
/// - Only `async fn` is accepted
/// - No generics and no `self`
#[proc_macro_attribute]
pub fn handler(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    handler::handler_impl(input_fn)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Attribute macro projecting a trait of remote methods onto a typed client
///
/// For a trait `Greeter`, emits the trait unchanged plus:
///
/// - `GreeterClient`, wrapping a `jroh_client::JrohClient`
/// - `GreeterClient::METHODS`, the method names in declaration order
/// - one `async fn` per signature, with the same arguments (taking `&self`)
///   and returning `jroh_core::Result<T>`, where `T` is the declared return
///   type with one level of `Result` removed
/// - `GreeterClient::new`, `GreeterClient::connect` and
///   `From<JrohClient>`
///
/// The projection is purely compile-time: nothing checks at runtime that
/// the server agrees with the signatures.
#[proc_macro_attribute]
pub fn rpc_client(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_trait = parse_macro_input!(item as ItemTrait);
    rpc_client::rpc_client_impl(item_trait)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
