//! # Typed Mediator
//!
//! Dispatches requests to their single handler through the behavior pipeline,
//! and broadcasts notifications to every registered handler concurrently.
//!
//! Handlers are stored type-erased in a table keyed by [`TypeId`] and
//! recovered by downcasting, the same way any typed value crosses an erased
//! boundary in this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! let mediator = Mediator::builder()
//!     .request_handler::<Ping, _>(PingHandler)
//!     .notification_handler::<Pinged, _>(audit)
//!     .resolver(Arc::new(container))
//!     .build();
//!
//! let pong = mediator.send(Ping).await?;
//! ```

use crate::pipeline::PipelineResolver;
use courier_core::{
    AggregateError, BoxError, CourierError, DispatchError, DynNotificationHandler,
    DynRequestHandler, EmptyResolver, Notification, NotificationHandler, Request,
    RequestHandler, Resolver,
};
use futures::future::join_all;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct RequestSlot<R: Request>(Arc<dyn DynRequestHandler<R>>);

struct NotificationSlot<N: Notification>(Vec<Arc<dyn DynNotificationHandler<N>>>);

/// Erased storage of typed handlers.
#[derive(Default)]
struct HandlerTable {
    requests: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    notifications: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl HandlerTable {
    fn request<R: Request>(&self) -> Option<Arc<dyn DynRequestHandler<R>>> {
        let slot = self
            .requests
            .get(&TypeId::of::<R>())?
            .downcast_ref::<RequestSlot<R>>()?;
        Some(Arc::clone(&slot.0))
    }

    fn notifications<N: Notification>(&self) -> &[Arc<dyn DynNotificationHandler<N>>] {
        self.notifications
            .get(&TypeId::of::<N>())
            .and_then(|slot| slot.downcast_ref::<NotificationSlot<N>>())
            .map(|slot| slot.0.as_slice())
            .unwrap_or(&[])
    }
}

/// Builder for [`Mediator`].
pub struct MediatorBuilder {
    table: HandlerTable,
    resolver: Arc<dyn Resolver>,
}

impl MediatorBuilder {
    /// Registers the handler for `R`, replacing any previous one.
    pub fn request_handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R>,
    {
        let slot = RequestSlot::<R>(Arc::new(handler));
        if self
            .table
            .requests
            .insert(TypeId::of::<R>(), Box::new(slot))
            .is_some()
        {
            tracing::warn!(request = type_name::<R>(), "request handler replaced");
        }
        self
    }

    /// Adds a handler for `N`.
    pub fn notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let slot = self
            .table
            .notifications
            .entry(TypeId::of::<N>())
            .or_insert_with(|| Box::new(NotificationSlot::<N>(Vec::new())));
        if let Some(slot) = slot.downcast_mut::<NotificationSlot<N>>() {
            slot.0.push(Arc::new(handler));
        }
        self
    }

    /// Sets the root resolver used for behaviors.
    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Finalizes the mediator.
    pub fn build(self) -> Mediator {
        Mediator {
            table: Arc::new(self.table),
            pipeline: Arc::new(PipelineResolver::new()),
            resolver: self.resolver,
        }
    }
}

/// In-process dispatcher of typed requests and notifications.
///
/// Cloning is cheap; clones share handlers and the pipeline cache.
#[derive(Clone)]
pub struct Mediator {
    table: Arc<HandlerTable>,
    pipeline: Arc<PipelineResolver>,
    resolver: Arc<dyn Resolver>,
}

impl Mediator {
    /// Starts building a mediator with no handlers and an empty resolver.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder {
            table: HandlerTable::default(),
            resolver: Arc::new(EmptyResolver),
        }
    }

    /// Returns a mediator sharing handlers but resolving from `resolver`.
    pub fn with_resolver(&self, resolver: Arc<dyn Resolver>) -> Self {
        Self {
            table: Arc::clone(&self.table),
            pipeline: Arc::clone(&self.pipeline),
            resolver,
        }
    }

    /// The resolver behaviors are looked up in.
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// The pipeline cache.
    pub fn pipeline(&self) -> &PipelineResolver {
        &self.pipeline
    }

    /// Returns `true` if a handler is registered for `R`.
    pub fn handles<R: Request>(&self) -> bool {
        self.table.requests.contains_key(&TypeId::of::<R>())
    }

    /// Dispatches `request` through its behaviors to its handler.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, CourierError> {
        self.send_with(request, &CancellationToken::new()).await
    }

    /// Like [`Mediator::send`], observing `cancel`.
    pub async fn send_with<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, CourierError> {
        let handler = self
            .table
            .request::<R>()
            .ok_or(DispatchError::NoHandler(type_name::<R>()))?;
        self.pipeline
            .execute(request, self.resolver.as_ref(), handler.as_ref(), cancel)
            .await
            .map_err(CourierError::from_boxed)
    }

    /// Delivers `notification` to every handler of `N` concurrently.
    ///
    /// All handlers run even if some fail; failures are returned together.
    pub async fn broadcast<N: Notification>(&self, notification: N) -> Result<(), CourierError> {
        let handlers = self.table.notifications::<N>();
        if handlers.is_empty() {
            tracing::trace!(notification = type_name::<N>(), "no notification handlers");
            return Ok(());
        }

        let results = join_all(
            handlers
                .iter()
                .map(|handler| handler.handle_dyn(notification.clone())),
        )
        .await;

        let failures: Vec<BoxError> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::Aggregate(AggregateError::new(failures)).into())
        }
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("requests", &self.table.requests.len())
            .field("notifications", &self.table.notifications.len())
            .finish_non_exhaustive()
    }
}
