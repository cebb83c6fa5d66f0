//! Validation stage.

use courier_core::{Behavior, BoxError, Next, Request};
use std::fmt;
use thiserror::Error;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// The offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationFailure {
    /// Creates a failure for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Returned when a request fails validation; the handler is not called.
#[derive(Debug, Error)]
#[error("validation failed with {} error(s)", .failures.len())]
pub struct ValidationFailed {
    /// Every failed rule.
    pub failures: Vec<ValidationFailure>,
}

/// Checks a request before it reaches its handler.
pub trait Validator<R: Request>: Send + Sync + 'static {
    /// Returns every failed rule; empty means valid.
    fn validate(&self, request: &R) -> Vec<ValidationFailure>;
}

impl<R, F> Validator<R> for F
where
    R: Request,
    F: Fn(&R) -> Vec<ValidationFailure> + Send + Sync + 'static,
{
    fn validate(&self, request: &R) -> Vec<ValidationFailure> {
        (self)(request)
    }
}

/// A behavior that runs a [`Validator`] and short-circuits on failure.
#[derive(Debug, Clone)]
pub struct ValidationBehavior<V> {
    validator: V,
}

impl<V> ValidationBehavior<V> {
    /// Wraps `validator`.
    pub fn new(validator: V) -> Self {
        Self { validator }
    }
}

impl<R, V> Behavior<R> for ValidationBehavior<V>
where
    R: Request,
    V: Validator<R>,
{
    async fn handle(&self, request: R, next: Next<'_, R>) -> Result<R::Response, BoxError> {
        let failures = self.validator.validate(&request);
        if !failures.is_empty() {
            tracing::debug!(failures = failures.len(), "request rejected by validation");
            return Err(Box::new(ValidationFailed { failures }));
        }
        next.run(request).await
    }
}
