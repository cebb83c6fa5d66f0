//! Message traits for requests and notifications.

use crate::behavior::BehaviorId;

/// A marker trait for every value that travels through a dispatcher.
///
/// Messages must be `Send + Sync + 'static` to cross task boundaries.
///
/// # Example
///
/// ```rust,ignore
/// struct Ping { id: u64 }
///
/// impl Message for Ping {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Every request, notification and response must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl Message for &'static str {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}
impl<T: Message, E: Message> Message for Result<T, E> {}

macro_rules! primitive_messages {
    ($($ty:ty),* $(,)?) => {
        $(impl Message for $ty {})*
    };
}

primitive_messages!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

/// A message answered by exactly one handler with a [`Request::Response`].
///
/// A request may declare an ordered list of behaviors that wrap its handler.
/// The first declared behavior is the outermost one.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Request",
    label = "missing `Request` implementation",
    note = "Requests must name their `Response` type."
)]
pub trait Request: Message {
    /// The value produced by the request handler.
    type Response: Message;

    /// Behavior identifiers wrapping this request, outermost first.
    fn behaviors() -> &'static [BehaviorId] {
        &[]
    }
}

/// A message delivered to every registered notification handler.
///
/// Notifications are cloned once per handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Notification",
    label = "missing `Notification` implementation",
    note = "Notifications must be `Clone` so that each handler receives its own copy."
)]
pub trait Notification: Message + Clone {}
