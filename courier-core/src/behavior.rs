//! # Behaviors
//!
//! Behaviors wrap a request handler the way middleware wraps a service. Each
//! one receives the request together with a [`Next`] continuation and decides
//! whether, and how, to call it.
//!
//! A request type declares the behaviors it wants through
//! [`Request::behaviors`]; instances are looked up by [`BehaviorKey`] from a
//! [`Resolver`](crate::Resolver) at dispatch time.

use crate::error::BoxError;
use crate::message::Request;
use futures::future::BoxFuture;
use std::any::{TypeId, type_name};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Name of a behavior as declared by a request type.
pub type BehaviorId = &'static str;

/// A behavior closed over a concrete request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviorKey {
    request: TypeId,
    response: TypeId,
    behavior: BehaviorId,
    request_name: &'static str,
}

impl BehaviorKey {
    /// Closes `behavior` over `R` and its response.
    pub fn of<R: Request>(behavior: BehaviorId) -> Self {
        Self {
            request: TypeId::of::<R>(),
            response: TypeId::of::<R::Response>(),
            behavior,
            request_name: type_name::<R>(),
        }
    }

    /// The behavior identifier.
    pub fn behavior(&self) -> BehaviorId {
        self.behavior
    }

    /// Type of the request.
    pub fn request(&self) -> TypeId {
        self.request
    }

    /// Type of the response.
    pub fn response(&self) -> TypeId {
        self.response
    }

    /// Readable name of the request type.
    pub fn request_name(&self) -> &'static str {
        self.request_name
    }
}

/// The rest of a pipeline, as seen from inside a behavior.
///
/// Calling [`Next::run`] invokes the next resolvable behavior, or the handler
/// when none is left. Dropping it without calling short-circuits the pipeline.
pub struct Next<'a, R: Request> {
    run: Box<dyn FnOnce(R) -> BoxFuture<'a, Result<R::Response, BoxError>> + Send + 'a>,
    cancellation: CancellationToken,
}

impl<'a, R: Request> Next<'a, R> {
    /// Wraps a continuation.
    pub fn new<F>(cancellation: CancellationToken, run: F) -> Self
    where
        F: FnOnce(R) -> BoxFuture<'a, Result<R::Response, BoxError>> + Send + 'a,
    {
        Self {
            run: Box::new(run),
            cancellation,
        }
    }

    /// Continues the pipeline with `request`.
    pub async fn run(self, request: R) -> Result<R::Response, BoxError> {
        (self.run)(request).await
    }

    /// Cancellation signal of the current dispatch.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// A stage wrapped around a request handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Behavior<{R}>`",
    label = "missing `Behavior` implementation",
    note = "Behaviors must implement `handle` for the specific request type `{R}`."
)]
pub trait Behavior<R: Request>: Send + Sync + 'static {
    /// Handles `request`, usually by calling `next`.
    fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
    ) -> impl Future<Output = Result<R::Response, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Behavior`].
pub trait DynBehavior<R: Request>: Send + Sync + 'static {
    /// Handles `request` (dynamic dispatch version).
    fn handle_dyn<'a>(
        self: Arc<Self>,
        request: R,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>>;
}

impl<R: Request, T: Behavior<R>> DynBehavior<R> for T {
    fn handle_dyn<'a>(
        self: Arc<Self>,
        request: R,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, Result<R::Response, BoxError>> {
        Box::pin(async move { self.handle(request, next).await })
    }
}

/// Storage slot under which resolvers keep behavior instances.
pub struct BehaviorSlot<R: Request>(pub Arc<dyn DynBehavior<R>>);

impl<R: Request> BehaviorSlot<R> {
    /// Erases `behavior` into a slot.
    pub fn new<B: Behavior<R>>(behavior: B) -> Self {
        Self(Arc::new(behavior))
    }
}
