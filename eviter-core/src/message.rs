//! Message trait for event payloads.

/// A marker trait for values carried by events.
///
/// Messages must be `Send + Sync + 'static` because listeners are invoked on
/// the producer's thread while the consumer reads from another task.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Person { name: String }
///
/// impl Message for Person {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Event payloads must be thread-safe and static. Use `#[derive(Message)]` or `impl Message for {Self} {{}}`."
)]
pub trait Message: Send + Sync + 'static {}

// Common Message implementations
impl Message for () {}
impl Message for bool {}
impl Message for char {}
impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}
impl<T: Message, E: Message> Message for Result<T, E> {}

macro_rules! impl_message {
    ($($ty:ty),* $(,)?) => {
        $(impl Message for $ty {})*
    };
}

impl_message!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// Multi-argument emissions are modelled as tuples.
macro_rules! impl_message_tuple {
    ($($name:ident),+) => {
        impl<$($name: Message),+> Message for ($($name,)+) {}
    };
}

impl_message_tuple!(A);
impl_message_tuple!(A, B);
impl_message_tuple!(A, B, C);
impl_message_tuple!(A, B, C, D);
