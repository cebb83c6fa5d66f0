use proc_macro::TokenStream;

mod message;
mod routable;

/// Derive macro for implementing the `Message` trait.
#[proc_macro_derive(Message)]
pub fn derive_message(input: TokenStream) -> TokenStream {
    message::derive_message_impl(input)
}

/// Derive macro for implementing `Message` and `Notification`.
#[proc_macro_derive(Notification)]
pub fn derive_notification(input: TokenStream) -> TokenStream {
    message::derive_notification_impl(input)
}

/// Derive macro for implementing `Message` and `Request`.
///
/// ```rust,ignore
/// #[derive(Request)]
/// #[request(response = String, behaviors("logging", "validation"))]
/// struct Greet { name: String }
/// ```
///
/// Without `response`, the response type is `()`.
#[proc_macro_derive(Request, attributes(request))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    message::derive_request_impl(input)
}

/// Derive macro for implementing `Routable`.
///
/// Reads `#[route(...)]`, `#[listen(...)]` and `#[filters(...)]`.
#[proc_macro_derive(Routable, attributes(route, listen, filters))]
pub fn derive_routable(input: TokenStream) -> TokenStream {
    routable::derive_routable_impl(input)
}
