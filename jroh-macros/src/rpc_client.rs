//! Typed client projection
//!
//! `#[rpc_client]` reads a trait of method signatures and emits, next to
//! the unchanged trait, a `<Trait>Client` struct with one async method per
//! signature. Each generated method serializes its arguments as positional
//! params and calls the remote method of the same name.
//!
//! # Return Types
//!
//! The declared return type `T` becomes `jroh_core::Result<T>`. A declared
//! `Result<T>` or `Result<T, E>` is unwrapped once, so the generated method
//! returns `jroh_core::Result<T>` as well; so is `impl Future<Output = T>`.
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! #[rpc_client]
//! pub trait Greeter {
//!     async fn hello(name: String) -> Result<String>;
//! }
//! ```
//!
//! Generated output (besides the trait itself):
//! ```ignore
//! #[derive(Clone, Debug)]
//! pub struct GreeterClient {
//!     client: jroh_client::JrohClient,
//! }
//!
//! impl GreeterClient {
//!     pub const METHODS: &'static [&'static str] = &["hello"];
//!
//!     pub async fn hello(&self, name: String) -> jroh_core::Result<String> {
//!         self.client.call("hello", (name,)).await
//!     }
//! }
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    FnArg, GenericArgument, ItemTrait, Pat, PathArguments, ReturnType, TraitItem, TraitItemFn,
    Type, TypeParamBound,
};

struct ProjectedMethod<'a> {
    item: &'a TraitItemFn,
    wire_name: String,
    args: Vec<(syn::Ident, &'a Type)>,
    output: TokenStream,
}

/// Implementation of the rpc_client attribute macro
pub fn rpc_client_impl(item_trait: ItemTrait) -> syn::Result<TokenStream> {
    if !item_trait.generics.params.is_empty() {
        return Err(syn::Error::new(
            item_trait.generics.span(),
            "#[rpc_client] traits cannot be generic",
        ));
    }

    let mut methods = Vec::new();
    for item in &item_trait.items {
        if let TraitItem::Fn(method) = item {
            methods.push(project(method)?);
        }
    }

    let vis = &item_trait.vis;
    let client_name = format_ident!("{}Client", item_trait.ident);
    let struct_doc = format!(
        "Typed JSON-RPC client for the methods of [`{}`]",
        item_trait.ident
    );
    let wire_names = methods.iter().map(|m| &m.wire_name);
    let generated = methods.iter().map(generate_method);

    Ok(quote! {
        #[allow(async_fn_in_trait)]
        #item_trait

        #[doc = #struct_doc]
        #[derive(Clone, Debug)]
        #vis struct #client_name {
            client: jroh_client::JrohClient,
        }

        impl #client_name {
            /// Names of every method this client can call
            pub const METHODS: &'static [&'static str] = &[#(#wire_names),*];

            /// Wrap an existing client
            pub fn new(client: jroh_client::JrohClient) -> Self {
                Self { client }
            }

            /// Create a client posting to `url` with the default transport
            pub fn connect(url: impl Into<String>) -> Self {
                Self::new(jroh_client::JrohClient::new(url))
            }

            /// The underlying untyped client
            pub fn client(&self) -> &jroh_client::JrohClient {
                &self.client
            }

            #(#generated)*
        }

        impl From<jroh_client::JrohClient> for #client_name {
            fn from(client: jroh_client::JrohClient) -> Self {
                Self::new(client)
            }
        }
    })
}

fn project(method: &TraitItemFn) -> syn::Result<ProjectedMethod<'_>> {
    let sig = &method.sig;

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "#[rpc_client] methods cannot be generic",
        ));
    }

    let mut args = Vec::new();
    for (position, input) in sig.inputs.iter().enumerate() {
        match input {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "#[rpc_client] signatures describe remote methods and cannot take self",
                ))
            }
            FnArg::Typed(pat_type) => {
                let ident = match pat_type.pat.as_ref() {
                    Pat::Ident(pat_ident) => pat_ident.ident.clone(),
                    _ => format_ident!("arg{}", position),
                };
                args.push((ident, pat_type.ty.as_ref()));
            }
        }
    }

    if args.len() > 8 {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "#[rpc_client] supports at most 8 params per method",
        ));
    }

    let output = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => {
            let ty = future_output(ty).unwrap_or(ty);
            let ty = result_ok(ty).unwrap_or(ty);
            quote! { #ty }
        }
    };

    Ok(ProjectedMethod {
        item: method,
        wire_name: sig.ident.unraw().to_string(),
        args,
        output,
    })
}

fn generate_method(method: &ProjectedMethod<'_>) -> TokenStream {
    let docs = method
        .item
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"));
    let name = &method.item.sig.ident;
    let wire_name = &method.wire_name;
    let output = &method.output;
    let params = method.args.iter().map(|(ident, ty)| quote! { #ident: #ty });
    let idents = method.args.iter().map(|(ident, _)| ident);

    quote! {
        #(#docs)*
        pub async fn #name(&self, #(#params),*) -> jroh_core::Result<#output> {
            self.client.call(#wire_name, (#(#idents,)*)).await
        }
    }
}

/// `T` for a type spelled `Result<T>` or `Result<T, E>`
fn result_ok(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(ok) => Some(ok),
        _ => None,
    }
}

/// `T` for a type spelled `impl Future<Output = T>`
fn future_output(ty: &Type) -> Option<&Type> {
    let Type::ImplTrait(impl_trait) = ty else {
        return None;
    };
    impl_trait.bounds.iter().find_map(|bound| {
        let TypeParamBound::Trait(trait_bound) = bound else {
            return None;
        };
        let segment = trait_bound.path.segments.last()?;
        if segment.ident != "Future" {
            return None;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::AssocType(assoc) if assoc.ident == "Output" => Some(&assoc.ty),
            _ => None,
        })
    })
}
