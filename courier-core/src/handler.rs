//! # Handlers
//!
//! Terminal units of work. A [`RequestHandler`] answers exactly one request
//! type; any number of [`NotificationHandler`]s may observe a notification.
//!
//! Both traits use native `async fn` for static dispatch, with an object-safe
//! `Dyn*` twin for storage in tables.

use crate::error::BoxError;
use crate::message::{Notification, Request};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Answers one request type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `RequestHandler<{R}>`",
    label = "missing `RequestHandler` implementation",
    note = "Request handlers must implement `handle` for the specific request type `{R}`."
)]
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    /// Produces the response for `request`.
    fn handle(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<R::Response, BoxError>> + Send;
}

/// Dynamic object-safe version of [`RequestHandler`].
pub trait DynRequestHandler<R: Request>: Send + Sync + 'static {
    /// Produces the response for `request` (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>>;
}

impl<R: Request, T: RequestHandler<R>> DynRequestHandler<R> for T {
    fn handle_dyn<'a>(
        &'a self,
        request: R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>> {
        Box::pin(self.handle(request, cancel))
    }
}

impl<F, R, Fut> RequestHandler<R> for F
where
    F: Fn(R) -> Fut + Send + Sync + 'static,
    R: Request,
    Fut: Future<Output = Result<R::Response, BoxError>> + Send,
{
    fn handle(
        &self,
        request: R,
        _cancel: &CancellationToken,
    ) -> impl Future<Output = Result<R::Response, BoxError>> + Send {
        (self)(request)
    }
}

/// Observes one notification type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `NotificationHandler<{N}>`",
    label = "missing `NotificationHandler` implementation",
    note = "Notification handlers must implement `handle` for the specific notification type `{N}`."
)]
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    /// Reacts to `notification`.
    fn handle(&self, notification: N) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Dynamic object-safe version of [`NotificationHandler`].
pub trait DynNotificationHandler<N: Notification>: Send + Sync + 'static {
    /// Reacts to `notification` (dynamic dispatch version).
    fn handle_dyn(&self, notification: N) -> BoxFuture<'_, Result<(), BoxError>>;
}

impl<N: Notification, T: NotificationHandler<N>> DynNotificationHandler<N> for T {
    fn handle_dyn(&self, notification: N) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(self.handle(notification))
    }
}

impl<F, N, Fut> NotificationHandler<N> for F
where
    F: Fn(N) -> Fut + Send + Sync + 'static,
    N: Notification,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    fn handle(&self, notification: N) -> impl Future<Output = Result<(), BoxError>> + Send {
        (self)(notification)
    }
}
