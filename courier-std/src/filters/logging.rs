//! Logging filter for keyed sends.

use courier_core::{BoxError, Filter, FilterNext, Payload, RequestContext};
use std::time::Instant;

/// A filter that logs the route, payload type and elapsed time of a send.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFilter;

impl Filter for LoggingFilter {
    async fn invoke(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        let started = Instant::now();
        tracing::info!(
            path = ctx.path(),
            payload = ctx.payload_type().name(),
            request = ctx.id(),
            "dispatching"
        );
        let result = next.run(ctx, payload).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => tracing::info!(
                path = ctx.path(),
                response = response.type_name(),
                elapsed_ms,
                "dispatched"
            ),
            Err(err) => tracing::warn!(path = ctx.path(), elapsed_ms, error = %err, "dispatch failed"),
        }
        result
    }
}
