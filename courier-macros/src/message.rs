//! Message-related derives.
//!
//! This module contains:
//! - `#[derive(Message)]` - Marker implementation of `Message`
//! - `#[derive(Request)]` - `Message` + `Request`, configured by `#[request(...)]`
//! - `#[derive(Notification)]` - `Message` + `Notification`

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitStr, Token, Type, parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Implementation of `#[derive(Message)]`.
pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::courier::Message for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Implementation of `#[derive(Notification)]`.
pub fn derive_notification_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::courier::Message for #name #ty_generics #where_clause {}
        impl #impl_generics ::courier::Notification for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// Arguments of the `#[request(...)]` attribute.
struct RequestArgs {
    response: Option<Type>,
    behaviors: Vec<LitStr>,
}

impl Parse for RequestArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut response = None;
        let mut behaviors = Vec::new();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "response" => {
                    input.parse::<Token![=]>()?;
                    response = Some(input.parse::<Type>()?);
                }
                "behaviors" => {
                    let content;
                    parenthesized!(content in input);
                    let ids = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    behaviors.extend(ids);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown request attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(RequestArgs {
            response,
            behaviors,
        })
    }
}

/// Implementation of `#[derive(Request)]`.
pub fn derive_request_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut args = RequestArgs {
        response: None,
        behaviors: Vec::new(),
    };
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("request")) {
        match attr.parse_args::<RequestArgs>() {
            Ok(parsed) => {
                if parsed.response.is_some() {
                    args.response = parsed.response;
                }
                args.behaviors.extend(parsed.behaviors);
            }
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let response = match args.response {
        Some(ty) => quote! { #ty },
        None => quote! { () },
    };
    let behaviors = &args.behaviors;
    let behaviors_fn = (!behaviors.is_empty()).then(|| {
        quote! {
            fn behaviors() -> &'static [::courier::BehaviorId] {
                &[#(#behaviors),*]
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::courier::Message for #name #ty_generics #where_clause {}

        impl #impl_generics ::courier::Request for #name #ty_generics #where_clause {
            type Response = #response;
            #behaviors_fn
        }
    };

    TokenStream::from(expanded)
}
