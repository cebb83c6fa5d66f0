//! Timeout filter for time-limited dispatch.

use courier_core::{BoxError, Filter, FilterNext, Payload, RequestContext};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Error returned when the rest of a chain takes too long.
#[derive(Debug, Clone, Error)]
#[error("dispatch to `{path}` timed out after {elapsed:?}")]
pub struct FilterTimeout {
    /// The route key.
    pub path: String,
    /// The configured limit.
    pub elapsed: Duration,
}

/// A filter that fails the send after `MILLIS` milliseconds.
///
/// The timed-out work is dropped and the context's cancellation is signalled.
/// Only the current send observes it; the caller's token is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutFilter<const MILLIS: u64>;

impl<const MILLIS: u64> TimeoutFilter<MILLIS> {
    /// The configured limit.
    pub const LIMIT: Duration = Duration::from_millis(MILLIS);
}

impl<const MILLIS: u64> Filter for TimeoutFilter<MILLIS> {
    async fn invoke(
        &self,
        ctx: &mut RequestContext,
        payload: Payload,
        next: FilterNext<'_>,
    ) -> Result<Payload, BoxError> {
        let outcome = timeout(Self::LIMIT, next.run(ctx, payload)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                ctx.cancellation().cancel();
                Err(Box::new(FilterTimeout {
                    path: ctx.path().to_owned(),
                    elapsed: Self::LIMIT,
                }))
            }
        }
    }
}
