//! Handler procedural macro implementation
//!
//! Parses the attributed `async fn`, moves its body into an inner function
//! with the same signature and emits a factory that wraps the inner
//! function with `from_typed_fn`.
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! #[handler]
//! async fn hello(ctx: RequestContext, name: String) -> Result<String> {
//!     Ok(format!("hello, {}!", name))
//! }
//! ```
//!
//! Generated output:
//! ```ignore
//! fn hello() -> Box<dyn jroh_server::Handler> {
//!     async fn inner_handler(ctx: RequestContext, name: String) -> Result<String> {
//!         Ok(format!("hello, {}!", name))
//!     }
//!
//!     jroh_server::from_typed_fn(
//!         |__ctx: jroh_server::RequestContext, (__arg0,): (String,)| {
//!             inner_handler(__ctx, __arg0)
//!         },
//!     )
//! }
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{FnArg, ItemFn, Type};

/// Implementation of the handler attribute macro
pub fn handler_impl(input_fn: ItemFn) -> syn::Result<TokenStream> {
    let sig = &input_fn.sig;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new(
            sig.fn_token.span(),
            "#[handler] requires an async fn",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "#[handler] functions cannot be generic",
        ));
    }

    let mut typed = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Typed(pat_type) => typed.push(pat_type),
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "#[handler] cannot be used on methods taking self",
                ))
            }
        }
    }

    // The context argument is optional and must come first
    let takes_context = typed
        .first()
        .map(|pat_type| is_request_context(&pat_type.ty))
        .unwrap_or(false);
    let param_types: Vec<&Type> = typed
        .iter()
        .skip(usize::from(takes_context))
        .map(|pat_type| pat_type.ty.as_ref())
        .collect();

    if param_types.len() > 8 {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "#[handler] supports at most 8 params besides the context",
        ));
    }

    let fn_name = &sig.ident;
    let fn_vis = &input_fn.vis;
    let fn_attrs = &input_fn.attrs;
    let fn_block = &input_fn.block;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let arg_idents: Vec<_> = (0..param_types.len())
        .map(|i| format_ident!("__arg{}", i))
        .collect();
    let forwarded_ctx = if takes_context {
        quote! { __ctx, }
    } else {
        quote! {}
    };

    Ok(quote! {
        #(#fn_attrs)*
        #fn_vis fn #fn_name() -> Box<dyn jroh_server::Handler> {
            async fn inner_handler(#inputs) #output #fn_block

            jroh_server::from_typed_fn(
                |__ctx: jroh_server::RequestContext, (#(#arg_idents,)*): (#(#param_types,)*)| {
                    inner_handler(#forwarded_ctx #(#arg_idents),*)
                },
            )
        }
    })
}

/// Whether a type names `RequestContext`, by its last path segment
fn is_request_context(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "RequestContext")
            .unwrap_or(false),
        Type::Group(group) => is_request_context(&group.elem),
        _ => false,
    }
}
