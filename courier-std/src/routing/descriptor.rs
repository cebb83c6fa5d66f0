//! Route descriptors stored in the registries.

use crate::routing::candidate::ErasedRoute;
use courier_core::{FilterType, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// How a descriptor's payload is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Sent to a single request handler.
    Request,
    /// Broadcast to notification handlers.
    Notification,
}

/// An immutable route entry: one key bound to one payload type.
#[derive(Clone)]
pub struct RouteDescriptor {
    key: Arc<str>,
    payload: TypeInfo,
    kind: RouteKind,
    filters: Arc<[FilterType]>,
    invoker: Arc<dyn ErasedRoute>,
}

impl RouteDescriptor {
    pub(crate) fn new(
        key: &str,
        payload: TypeInfo,
        kind: RouteKind,
        filters: Arc<[FilterType]>,
        invoker: Arc<dyn ErasedRoute>,
    ) -> Self {
        Self {
            key: Arc::from(key),
            payload,
            kind,
            filters,
            invoker,
        }
    }

    /// The route key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The payload type bound to the key.
    pub fn payload(&self) -> TypeInfo {
        self.payload
    }

    /// How the payload is dispatched.
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Filters applied around the terminal dispatch, outermost first.
    pub fn filters(&self) -> &[FilterType] {
        &self.filters
    }

    pub(crate) fn invoker(&self) -> &Arc<dyn ErasedRoute> {
        &self.invoker
    }
}

impl PartialEq for RouteDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.payload == other.payload
            && self.kind == other.kind
            && self.filters == other.filters
    }
}

impl Eq for RouteDescriptor {}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("key", &self.key)
            .field("payload", &self.payload.name())
            .field("kind", &self.kind)
            .field("filters", &self.filters)
            .finish()
    }
}
