//! Authorization stage.

use courier_core::{Behavior, BoxError, Next, Request};
use std::any::type_name;
use std::future::Future;
use thiserror::Error;

/// Decision of an [`Authorizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// The request may proceed.
    Granted,
    /// The request is refused, with a reason.
    Denied(String),
}

/// Returned when a request is refused; the handler is not called.
#[derive(Debug, Error)]
#[error("request `{request}` is not authorized: {reason}")]
pub struct Unauthorized {
    /// Name of the refused request type.
    pub request: &'static str,
    /// Reason given by the authorizer.
    pub reason: String,
}

/// Decides whether a request may reach its handler.
pub trait Authorizer<R: Request>: Send + Sync + 'static {
    /// Decides on `request`.
    fn authorize(&self, request: &R) -> impl Future<Output = Authorization> + Send;
}

/// A behavior that asks an [`Authorizer`] first.
#[derive(Debug, Clone)]
pub struct AuthorizationBehavior<A> {
    authorizer: A,
}

impl<A> AuthorizationBehavior<A> {
    /// Wraps `authorizer`.
    pub fn new(authorizer: A) -> Self {
        Self { authorizer }
    }
}

impl<R, A> Behavior<R> for AuthorizationBehavior<A>
where
    R: Request,
    A: Authorizer<R>,
{
    async fn handle(&self, request: R, next: Next<'_, R>) -> Result<R::Response, BoxError> {
        match self.authorizer.authorize(&request).await {
            Authorization::Granted => next.run(request).await,
            Authorization::Denied(reason) => {
                tracing::debug!(request = type_name::<R>(), %reason, "request denied");
                Err(Box::new(Unauthorized {
                    request: type_name::<R>(),
                    reason,
                }))
            }
        }
    }
}
