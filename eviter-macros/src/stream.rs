//! Stream delegation derive.
//!
//! This module contains:
//! - `#[derive(EventStream)]` - Derive macro for specialised iterators that
//!   wrap an `EventIterator` and should behave like one

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Index, Member, parse_macro_input};

const ATTR: &str = "event_iterator";

/// Pick the wrapped field: the only field, or the one marked `#[event_iterator]`.
fn select_field(input: &DeriveInput) -> syn::Result<(Member, &Field)> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "EventStream can only be derived for structs",
        ));
    };

    let fields: Vec<(Member, &Field)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone().map(|ident| (Member::Named(ident), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (Member::Unnamed(Index::from(i)), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    let mut marked = fields
        .iter()
        .filter(|(_, f)| f.attrs.iter().any(|a| a.path().is_ident(ATTR)));
    if let Some(found) = marked.next() {
        if let Some((_, extra)) = marked.next() {
            return Err(syn::Error::new_spanned(
                extra,
                "only one field may be marked #[event_iterator]",
            ));
        }
        return Ok(found.clone());
    }

    match fields.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "EventStream needs a single field, or one field marked #[event_iterator]",
        )),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let (member, field) = select_field(input)?;
    let name = &input.ident;
    let inner_ty = &field.ty;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let mut where_clause = where_clause.cloned().unwrap_or_else(|| syn::parse_quote!(where));
    where_clause
        .predicates
        .push(syn::parse_quote!(Self: ::core::marker::Unpin));

    Ok(quote! {
        impl #impl_generics ::eviter::futures::Stream for #name #ty_generics #where_clause {
            type Item = <#inner_ty as ::eviter::futures::Stream>::Item;

            fn poll_next(
                self: ::core::pin::Pin<&mut Self>,
                cx: &mut ::core::task::Context<'_>,
            ) -> ::core::task::Poll<::core::option::Option<Self::Item>> {
                ::eviter::futures::Stream::poll_next(
                    ::core::pin::Pin::new(&mut self.get_mut().#member),
                    cx,
                )
            }

            fn size_hint(&self) -> (usize, ::core::option::Option<usize>) {
                ::eviter::futures::Stream::size_hint(&self.#member)
            }
        }

        impl #impl_generics ::eviter::futures::stream::FusedStream for #name #ty_generics #where_clause {
            fn is_terminated(&self) -> bool {
                ::eviter::futures::stream::FusedStream::is_terminated(&self.#member)
            }
        }

        impl #impl_generics ::core::ops::Deref for #name #ty_generics #where_clause {
            type Target = #inner_ty;

            fn deref(&self) -> &Self::Target {
                &self.#member
            }
        }
    })
}

/// Implementation of `#[derive(EventStream)]`.
pub fn derive_event_stream_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
