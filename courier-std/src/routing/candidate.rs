//! Registration candidates and their erased invokers.

use crate::mediator::Mediator;
use crate::routing::translate;
use bitflags::bitflags;
use courier_core::{
    BoxError, FilterType, Notification, Payload, Request, Routable, TranslateError, TypeInfo,
};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

bitflags! {
    /// What a payload type can be dispatched as.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Answered by a single request handler.
        const REQUEST = 0b01;
        /// Broadcast to notification handlers.
        const NOTIFICATION = 0b10;
    }
}

/// Type-erased bridge from neutral values to a typed mediator call.
pub(crate) trait ErasedRoute: Send + Sync {
    fn decode(&self, value: Value) -> Result<Payload, TranslateError>;

    fn encode(&self, response: Payload) -> Result<Value, TranslateError>;

    fn dispatch<'a>(
        &'a self,
        mediator: &'a Mediator,
        payload: Payload,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Payload, BoxError>>;
}

fn mismatch<T>(payload: Payload) -> TranslateError {
    TranslateError::TypeMismatch {
        expected: type_name::<T>(),
        actual: payload.type_name(),
    }
}

struct RequestRoute<T>(PhantomData<fn() -> T>);

impl<T> ErasedRoute for RequestRoute<T>
where
    T: Request + Routable,
    T::Response: Serialize,
{
    fn decode(&self, value: Value) -> Result<Payload, TranslateError> {
        translate::from_neutral::<T>(value).map(Payload::new)
    }

    fn encode(&self, response: Payload) -> Result<Value, TranslateError> {
        let response = response
            .downcast::<T::Response>()
            .map_err(mismatch::<T::Response>)?;
        translate::to_neutral(&response)
    }

    fn dispatch<'a>(
        &'a self,
        mediator: &'a Mediator,
        payload: Payload,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Payload, BoxError>> {
        Box::pin(async move {
            let request = payload.downcast::<T>().map_err(mismatch::<T>)?;
            let response = mediator.send_with(request, cancel).await?;
            Ok(Payload::new(response))
        })
    }
}

struct NotificationRoute<T>(PhantomData<fn() -> T>);

impl<T> ErasedRoute for NotificationRoute<T>
where
    T: Notification + Routable,
{
    fn decode(&self, value: Value) -> Result<Payload, TranslateError> {
        translate::from_neutral::<T>(value).map(Payload::new)
    }

    fn encode(&self, _response: Payload) -> Result<Value, TranslateError> {
        Ok(Value::Null)
    }

    fn dispatch<'a>(
        &'a self,
        mediator: &'a Mediator,
        payload: Payload,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Payload, BoxError>> {
        Box::pin(async move {
            let notification = payload.downcast::<T>().map_err(mismatch::<T>)?;
            mediator.broadcast(notification).await?;
            Ok(Payload::unit())
        })
    }
}

/// A payload type offered for registration.
///
/// Carries the type's capabilities, declared keys and filters, plus the
/// erased machinery needed to dispatch it by key.
#[derive(Clone)]
pub struct Candidate {
    payload: TypeInfo,
    capabilities: Capabilities,
    routes: &'static [&'static str],
    listen_keys: &'static [&'static str],
    filters: Vec<FilterType>,
    invoker: Arc<dyn ErasedRoute>,
}

impl Candidate {
    /// A request type.
    pub fn request<T>() -> Self
    where
        T: Request + Routable,
        T::Response: Serialize,
    {
        Self {
            payload: TypeInfo::of::<T>(),
            capabilities: Capabilities::REQUEST,
            routes: T::routes(),
            listen_keys: T::listen_keys(),
            filters: T::filters(),
            invoker: Arc::new(RequestRoute::<T>(PhantomData)),
        }
    }

    /// A notification type.
    pub fn notification<T>() -> Self
    where
        T: Notification + Routable,
    {
        Self {
            payload: TypeInfo::of::<T>(),
            capabilities: Capabilities::NOTIFICATION,
            routes: T::routes(),
            listen_keys: T::listen_keys(),
            filters: T::filters(),
            invoker: Arc::new(NotificationRoute::<T>(PhantomData)),
        }
    }

    /// The payload type.
    pub fn payload(&self) -> TypeInfo {
        self.payload
    }

    /// Name of the payload type.
    pub fn type_name(&self) -> &'static str {
        self.payload.name()
    }

    /// How the type can be dispatched.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Declared service paths.
    pub fn routes(&self) -> &'static [&'static str] {
        self.routes
    }

    /// Declared listen keys.
    pub fn listen_keys(&self) -> &'static [&'static str] {
        self.listen_keys
    }

    /// Filters declared on the type.
    pub fn filters(&self) -> &[FilterType] {
        &self.filters
    }

    pub(crate) fn invoker(&self) -> &Arc<dyn ErasedRoute> {
        &self.invoker
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("payload", &self.payload.name())
            .field("capabilities", &self.capabilities)
            .field("routes", &self.routes)
            .field("listen_keys", &self.listen_keys)
            .field("filters", &self.filters)
            .finish()
    }
}
