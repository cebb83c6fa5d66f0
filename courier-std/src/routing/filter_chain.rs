//! Ordered filters around a terminal dispatch.

use courier_core::{BoxError, DynFilter, FilterNext, FilterType, Payload, RequestContext, Terminal};
use std::sync::Arc;

/// A fixed sequence of filter instances, outermost first.
///
/// The chain is assembled before it runs and is not changed while running.
#[derive(Default, Clone)]
pub struct FilterChain {
    filters: Vec<Arc<dyn DynFilter>>,
}

impl FilterChain {
    /// A chain over existing instances.
    pub fn new(filters: Vec<Arc<dyn DynFilter>>) -> Self {
        Self { filters }
    }

    /// A chain of fresh instances of `types`.
    pub fn instantiate(types: &[FilterType]) -> Self {
        Self::new(types.iter().map(FilterType::instantiate).collect())
    }

    /// Appends a filter as the new innermost one.
    pub fn push(&mut self, filter: Arc<dyn DynFilter>) {
        self.filters.push(filter);
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the payload through every filter and then `terminal`.
    pub async fn run(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        terminal: &dyn Terminal,
    ) -> Result<Payload, BoxError> {
        tracing::trace!(path = ctx.path(), filters = self.filters.len(), "running filter chain");
        FilterNext::new(&self.filters, terminal).run(ctx, payload).await
    }
}
