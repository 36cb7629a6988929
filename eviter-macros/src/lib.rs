//! # eviter-macros
//!
//! Procedural macros for eviter. Enable through the `macros` feature of the
//! `eviter` crate rather than depending on this crate directly.

use proc_macro::TokenStream;

mod message;
mod stream;

/// Derive macro for implementing the `Message` trait.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, eviter::Message)]
/// struct Person {
///     name: String,
/// }
/// ```
#[proc_macro_derive(Message)]
pub fn derive_message(input: TokenStream) -> TokenStream {
    message::derive_message_impl(input)
}

/// Derive macro for iterators specialised to one payload shape.
///
/// Wrap an `EventIterator` in a newtype and derive `EventStream` to make the
/// wrapper a `Stream` (and `FusedStream`) delegating to it. The wrapper also
/// derefs to the iterator, so `end()`, `is_ended()` and friends stay
/// available.
///
/// The wrapped field is the struct's only field, or the one marked
/// `#[event_iterator]`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(eviter::EventStream)]
/// struct PeopleIterator(EventIterator<Person>);
///
/// #[derive(eviter::EventStream)]
/// struct Rows {
///     #[event_iterator]
///     inner: EventIterator<Row, Database>,
///     table: String,
/// }
/// ```
#[proc_macro_derive(EventStream, attributes(event_iterator))]
pub fn derive_event_stream(input: TokenStream) -> TokenStream {
    stream::derive_event_stream_impl(input)
}
