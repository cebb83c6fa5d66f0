//! # Dispatch Client
//!
//! The public facade for keyed dispatch:
//!
//! - [`DispatchClient::send`]: request/response by service path
//! - [`DispatchClient::execute`]: the same, discarding the result
//! - [`DispatchClient::publish`]: fire-and-forget fan-out by listen key
//!
//! # Example
//!
//! ```rust,ignore
//! let client = DispatchClient::builder(mediator, Arc::new(container))
//!     .route(Candidate::request::<GetOrder>())
//!     .listener(Candidate::notification::<OrderShipped>())
//!     .build()?;
//!
//! let order: Option<OrderView> = client.send("orders/get", &json!({ "Id": "678" })).await?;
//! client.publish("orders.shipped", &shipped)?;
//! ```

mod builder;
mod options;
mod publish;

pub use builder::ClientBuilder;
pub use options::{ClientOptions, PublishErrorHook, PublishHook, PublishOptions};
pub use publish::{PublishHandle, PublishReport};

use crate::mediator::Mediator;
use crate::routing::{FilterChain, ListenerRegistry, RouteDescriptor, ServiceRegistry, translate};
use courier_core::{
    BoxError, ConfigError, CourierError, DispatchError, Payload, PublishContext, RequestContext,
    RoutingError, ScopeFactory, Terminal, TypeInfo,
};
use futures::future::BoxFuture;
use publish::Fanout;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

struct ClientInner {
    services: ServiceRegistry,
    listeners: ListenerRegistry,
    mediator: Mediator,
    scopes: Arc<dyn ScopeFactory>,
    options: ClientOptions,
}

/// Keyed front door to a [`Mediator`].
///
/// Cloning is cheap; clones share registries.
#[derive(Clone)]
pub struct DispatchClient {
    inner: Arc<ClientInner>,
}

/// Terminal step of a send: the route's typed dispatch.
struct RouteTerminal<'r> {
    route: &'r RouteDescriptor,
    mediator: &'r Mediator,
}

impl Terminal for RouteTerminal<'_> {
    fn call<'c>(
        &'c self,
        ctx: &'c mut RequestContext,
        payload: Payload,
    ) -> BoxFuture<'c, Result<Payload, BoxError>> {
        self.route
            .invoker()
            .dispatch(self.mediator, payload, ctx.cancellation())
    }
}

impl DispatchClient {
    /// Starts building a client around `mediator`.
    ///
    /// `scopes` opens the isolated scope of each publish occurrence.
    pub fn builder(mediator: Mediator, scopes: Arc<dyn ScopeFactory>) -> ClientBuilder {
        ClientBuilder::new(mediator, scopes)
    }

    pub(crate) fn from_parts(
        services: ServiceRegistry,
        listeners: ListenerRegistry,
        mediator: Mediator,
        scopes: Arc<dyn ScopeFactory>,
        options: ClientOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                services,
                listeners,
                mediator,
                scopes,
                options,
            }),
        }
    }

    /// The service registry.
    pub fn services(&self) -> &ServiceRegistry {
        &self.inner.services
    }

    /// The listener registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    /// The underlying mediator.
    pub fn mediator(&self) -> &Mediator {
        &self.inner.mediator
    }

    /// Client-wide options.
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Sends `payload` to the service at `path` and reads the result as `Res`.
    ///
    /// Returns `Ok(None)` when the handler produced no value. Unknown paths fail
    /// before any handler work starts.
    pub async fn send<Res, P>(&self, path: &str, payload: &P) -> Result<Option<Res>, CourierError>
    where
        Res: DeserializeOwned + 'static,
        P: Serialize + ?Sized,
    {
        self.send_with(path, payload, CancellationToken::new()).await
    }

    /// Like [`DispatchClient::send`], observing `cancel`.
    ///
    /// The send runs under a child of `cancel`; a filter that cancels its
    /// context never cancels the caller's token.
    pub async fn send_with<Res, P>(
        &self,
        path: &str,
        payload: &P,
        cancel: CancellationToken,
    ) -> Result<Option<Res>, CourierError>
    where
        Res: DeserializeOwned + 'static,
        P: Serialize + ?Sized,
    {
        let (route, raw) = self
            .dispatch(path, payload, Some(TypeInfo::of::<Res>()), cancel)
            .await?;
        let neutral = route.invoker().encode(raw)?;
        Ok(translate::to_requested(neutral)?)
    }

    /// Sends `payload` to the service at `path`, discarding any result.
    pub async fn execute<P>(&self, path: &str, payload: &P) -> Result<(), CourierError>
    where
        P: Serialize + ?Sized,
    {
        self.execute_with(path, payload, CancellationToken::new()).await
    }

    /// Like [`DispatchClient::execute`], observing `cancel`.
    pub async fn execute_with<P>(
        &self,
        path: &str,
        payload: &P,
        cancel: CancellationToken,
    ) -> Result<(), CourierError>
    where
        P: Serialize + ?Sized,
    {
        self.dispatch(path, payload, None, cancel).await.map(drop)
    }

    async fn dispatch<P>(
        &self,
        path: &str,
        payload: &P,
        result_type: Option<TypeInfo>,
        cancel: CancellationToken,
    ) -> Result<(RouteDescriptor, Payload), CourierError>
    where
        P: Serialize + ?Sized,
    {
        let route = self
            .inner
            .services
            .lookup(path)
            .ok_or_else(|| RoutingError::NotFound(path.to_owned()))?;

        let neutral = translate::to_neutral(payload)?;
        if neutral.is_null() {
            return Err(ConfigError::NullArgument("payload").into());
        }
        let typed = route.invoker().decode(neutral)?;

        let mut ctx = RequestContext::new(
            new_id(),
            path,
            route.payload(),
            Arc::clone(self.inner.mediator.resolver()),
        )
        .with_cancellation(cancel.child_token());
        if let Some(result_type) = result_type {
            ctx = ctx.with_result_type(result_type);
        }

        let span = tracing::debug_span!("send", path = %path, request = %ctx.id());
        let raw = async {
            let started = Instant::now();
            let chain = FilterChain::instantiate(route.filters());
            let terminal = RouteTerminal {
                route: &route,
                mediator: &self.inner.mediator,
            };
            let outcome = chain.run(&mut ctx, typed, &terminal).await;
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = outcome.is_ok(),
                "send completed"
            );
            outcome.map_err(CourierError::from_boxed)
        }
        .instrument(span)
        .await?;
        Ok((route, raw))
    }

    /// Publishes `event` to every listener of `key` and returns immediately.
    ///
    /// Listeners run concurrently in the background inside one fresh scope, with
    /// the occurrence's [`PublishContext`] visible through
    /// [`ambient::current`](crate::ambient::current). Their failures are logged,
    /// reported through the error hook and never returned here. A key with no
    /// listeners is not an error.
    pub fn publish<E>(&self, key: &str, event: &E) -> Result<PublishHandle, CourierError>
    where
        E: Serialize + ?Sized,
    {
        self.publish_with(key, event, PublishOptions::default())
    }

    /// Like [`DispatchClient::publish`], with headers and hooks.
    pub fn publish_with<E>(
        &self,
        key: &str,
        event: &E,
        mut options: PublishOptions,
    ) -> Result<PublishHandle, CourierError>
    where
        E: Serialize + ?Sized,
    {
        let data = translate::to_neutral(event)?;
        if data.is_null() {
            return Err(ConfigError::NullArgument("event").into());
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;

        let mut headers = self.inner.options.default_headers.clone();
        headers.extend(std::mem::take(&mut options.headers));
        let context = Arc::new(PublishContext::new(
            new_id(),
            key,
            chrono::Utc::now().timestamp_micros(),
            headers,
        ));

        let fanout = Fanout {
            data,
            listeners: self.inner.listeners.lookup_all(key),
            context,
            options,
            mediator: self.inner.mediator.clone(),
            scopes: Arc::clone(&self.inner.scopes),
        };
        if fanout.listeners.is_empty() {
            tracing::debug!(key, "no listeners for key");
            return Ok(PublishHandle::finished(fanout.empty_report()));
        }

        let context_id = fanout.context.id().to_owned();
        let task = runtime.spawn(fanout.run());
        Ok(PublishHandle::spawned(context_id, task))
    }
}

impl fmt::Debug for DispatchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchClient")
            .field("services", &self.inner.services.len())
            .field("listeners", &self.inner.listeners.len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
