//! # Filters
//!
//! Filters wrap the terminal dispatch of a keyed send. They see the
//! [`RequestContext`] and the erased [`Payload`], may rewrite either, and
//! decide whether to continue.
//!
//! Unlike behaviors, filters are attached to routes, not request types, and are
//! default-constructed from a [`FilterType`] for every send.

use crate::context::RequestContext;
use crate::error::{BoxError, DispatchError};
use crate::payload::Payload;
use futures::future::{self, BoxFuture};
use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The innermost step of a filter chain.
pub trait Terminal: Send + Sync {
    /// Dispatches the payload and returns the raw result.
    fn call<'c>(
        &'c self,
        ctx: &'c mut RequestContext,
        payload: Payload,
    ) -> BoxFuture<'c, Result<Payload, BoxError>>;
}

impl<F, Fut> Terminal for F
where
    F: Fn(Payload) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Payload, BoxError>> + Send + 'static,
{
    fn call<'c>(
        &'c self,
        _ctx: &'c mut RequestContext,
        payload: Payload,
    ) -> BoxFuture<'c, Result<Payload, BoxError>> {
        Box::pin((self)(payload))
    }
}

/// The rest of a filter chain, as seen from inside a filter.
pub struct FilterNext<'a> {
    filters: &'a [Arc<dyn DynFilter>],
    terminal: &'a dyn Terminal,
}

impl<'a> FilterNext<'a> {
    /// Starts a chain over `filters`, outermost first.
    pub fn new(filters: &'a [Arc<dyn DynFilter>], terminal: &'a dyn Terminal) -> Self {
        Self { filters, terminal }
    }

    /// Passes the payload to the next filter, or to the terminal.
    pub fn run<'c>(
        self,
        ctx: &'c mut RequestContext,
        payload: Payload,
    ) -> BoxFuture<'c, Result<Payload, BoxError>>
    where
        'a: 'c,
    {
        if ctx.cancellation().is_cancelled() {
            return Box::pin(future::ready(Err(DispatchError::Cancelled.into())));
        }
        match self.filters.split_first() {
            Some((filter, rest)) => filter.invoke_dyn(ctx, payload, FilterNext::new(rest, self.terminal)),
            None => self.terminal.call(ctx, payload),
        }
    }

    /// Number of filters still ahead.
    pub fn remaining(&self) -> usize {
        self.filters.len()
    }
}

/// A stage wrapped around the terminal dispatch of a route.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Filter",
    label = "missing `Filter` implementation",
    note = "Filters must implement `invoke`."
)]
pub trait Filter: Send + Sync + 'static {
    /// Handles the payload, usually by calling `next`.
    fn invoke(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        next: FilterNext<'_>,
    ) -> impl Future<Output = Result<Payload, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Filter`].
pub trait DynFilter: Send + Sync + 'static {
    /// Handles the payload (dynamic dispatch version).
    fn invoke_dyn<'c>(
        &'c self,
        ctx: &'c mut RequestContext,
        payload: Payload,
        next: FilterNext<'c>,
    ) -> BoxFuture<'c, Result<Payload, BoxError>>;
}

impl<T: Filter> DynFilter for T {
    fn invoke_dyn<'c>(
        &'c self,
        ctx: &'c mut RequestContext,
        payload: Payload,
        next: FilterNext<'c>,
    ) -> BoxFuture<'c, Result<Payload, BoxError>> {
        Box::pin(self.invoke(ctx, payload, next))
    }
}

/// A filter type that can be instantiated on demand.
#[derive(Clone, Copy)]
pub struct FilterType {
    name: &'static str,
    construct: fn() -> Arc<dyn DynFilter>,
}

impl FilterType {
    /// Describes the default-constructible filter `F`.
    pub fn of<F: Filter + Default>() -> Self {
        Self {
            name: type_name::<F>(),
            construct: construct::<F>,
        }
    }

    /// Name of the filter type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Creates a fresh instance.
    pub fn instantiate(&self) -> Arc<dyn DynFilter> {
        (self.construct)()
    }
}

fn construct<F: Filter + Default>() -> Arc<dyn DynFilter> {
    Arc::new(F::default())
}

impl PartialEq for FilterType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FilterType {}

impl fmt::Debug for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterType").field(&self.name).finish()
    }
}
