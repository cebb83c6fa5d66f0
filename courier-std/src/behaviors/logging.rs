//! Logging behavior for request observation.

use courier_core::{Behavior, BoxError, Next, Request};
use std::any::type_name;
use std::time::Instant;

/// A behavior that logs requests and how they ended.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

impl<R: Request> Behavior<R> for LoggingBehavior {
    async fn handle(&self, request: R, next: Next<'_, R>) -> Result<R::Response, BoxError> {
        let started = Instant::now();
        tracing::info!(request = type_name::<R>(), "handling request");
        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::info!(request = type_name::<R>(), elapsed_ms, "request handled"),
            Err(err) => {
                tracing::warn!(request = type_name::<R>(), elapsed_ms, error = %err, "request failed")
            }
        }
        result
    }
}
