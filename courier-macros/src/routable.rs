//! `#[derive(Routable)]`.
//!
//! ```rust,ignore
//! #[derive(Serialize, Deserialize, Request, Routable)]
//! #[request(response = OrderView)]
//! #[route("orders/get", "orders/fetch")]
//! #[listen("orders.refresh")]
//! #[filters(AuditFilter, LoggingFilter)]
//! struct GetOrder { id: String }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, DeriveInput, LitStr, Path, Token, parse_macro_input, punctuated::Punctuated,
};

fn keys(attrs: &[Attribute], name: &str) -> syn::Result<Vec<LitStr>> {
    let mut keys = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident(name)) {
        let parsed = attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)?;
        for key in parsed {
            if key.value().is_empty() {
                return Err(syn::Error::new(key.span(), "route keys must not be empty"));
            }
            keys.push(key);
        }
    }
    Ok(keys)
}

fn filters(attrs: &[Attribute]) -> syn::Result<Vec<Path>> {
    let mut filters = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("filters")) {
        filters.extend(attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?);
    }
    Ok(filters)
}

/// Implementation of `#[derive(Routable)]`.
pub fn derive_routable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let routes = keys(&input.attrs, "route")?;
    let listen = keys(&input.attrs, "listen")?;
    let filters = filters(&input.attrs)?;

    Ok(quote! {
        impl #impl_generics ::courier::Routable for #name #ty_generics #where_clause {
            fn routes() -> &'static [&'static str] {
                &[#(#routes),*]
            }

            fn listen_keys() -> &'static [&'static str] {
                &[#(#listen),*]
            }

            fn filters() -> ::std::vec::Vec<::courier::FilterType> {
                ::std::vec![#(::courier::FilterType::of::<#filters>()),*]
            }
        }
    })
}
