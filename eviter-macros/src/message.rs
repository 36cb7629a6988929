//! Message derive.
//!
//! This module contains:
//! - `#[derive(Message)]` - Derive macro for implementing the `Message` trait

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Implementation of `#[derive(Message)]`.
///
/// Generic parameters are required to be `Message` themselves, so that the
/// `Send + Sync + 'static` supertraits hold.
pub fn derive_message_impl(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    for param in input.generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(::eviter::Message));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::eviter::Message for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}
