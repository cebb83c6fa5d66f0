//! Error types for Courier.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`CourierError`] - Top-level error type returned to callers
//! - [`ConfigError`] - Registration and argument errors
//! - [`RoutingError`] - Unknown route keys
//! - [`TranslateError`] - Payload and result conversion failures
//! - [`DispatchError`] - Errors raised while running handlers

use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Courier operations.
#[derive(Error, Debug)]
pub enum CourierError {
    /// Invalid registration or argument.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The route key is unknown.
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    /// A payload or result could not be converted.
    #[error("translation error: {0}")]
    Translate(#[from] TranslateError),

    /// The dispatch itself failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// An error produced by a handler, behavior or filter, passed through unchanged.
    #[error(transparent)]
    Handler(BoxError),
}

impl CourierError {
    /// Recovers a structured error from a boxed one.
    ///
    /// Errors that cross an erased boundary come back as [`BoxError`]; anything that is
    /// not one of Courier's own error types is kept as [`CourierError::Handler`].
    pub fn from_boxed(err: BoxError) -> Self {
        let err = match err.downcast::<CourierError>() {
            Ok(inner) => return *inner,
            Err(err) => err,
        };
        let err = match err.downcast::<DispatchError>() {
            Ok(inner) => return Self::Dispatch(*inner),
            Err(err) => err,
        };
        let err = match err.downcast::<TranslateError>() {
            Ok(inner) => return Self::Translate(*inner),
            Err(err) => err,
        };
        let err = match err.downcast::<RoutingError>() {
            Ok(inner) => return Self::Routing(*inner),
            Err(err) => err,
        };
        match err.downcast::<ConfigError>() {
            Ok(inner) => Self::Config(*inner),
            Err(err) => Self::Handler(err),
        }
    }

    /// Returns the handler error as `T`, if this is a handler error of that type.
    pub fn handler_error<T: std::error::Error + 'static>(&self) -> Option<&T> {
        match self {
            Self::Handler(err) => err.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns `true` if the operation observed a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Dispatch(DispatchError::Cancelled))
    }
}

/// Why a candidate type cannot be registered for a destination.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The type is neither a request nor a notification of the required kind.
    #[error("it does not implement the capability `{expected}`")]
    MissingCapability {
        /// Capability the destination requires.
        expected: &'static str,
    },

    /// The type declares no route keys.
    #[error("it declares no route keys")]
    MissingRoutes,

    /// The type declares no listen keys.
    #[error("it declares no listen keys")]
    MissingListenKeys,
}

/// Errors raised while configuring registries or validating arguments.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required argument carried no value.
    #[error("argument `{0}` must not be null")]
    NullArgument(&'static str),

    /// A declared key was empty.
    #[error("`{0}` declares an empty key")]
    EmptyKey(&'static str),

    /// The type is not eligible for the destination registry.
    #[error("type `{type_name}` cannot be registered: {reason}")]
    Ineligible {
        /// Name of the rejected type.
        type_name: &'static str,
        /// The failed check.
        reason: Ineligibility,
    },

    /// A service route key is already taken.
    #[error("route `{key}` is already registered by `{existing}` (rejected `{rejected}`)")]
    DuplicateRoute {
        /// The contested key.
        key: String,
        /// Type that owns the key.
        existing: &'static str,
        /// Type whose registration was refused.
        rejected: &'static str,
    },
}

/// Errors that can occur during routing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No route was found for the given key.
    #[error("no route found for key: {0}")]
    NotFound(String),
}

/// Errors raised while translating payloads and results.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The neutral value does not fit the target type.
    #[error("payload does not match the shape of `{target}`: {source}")]
    PayloadShape {
        /// Target type name.
        target: &'static str,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be turned into the neutral representation.
    #[error("value of type `{source_type}` cannot be encoded: {source}")]
    Encode {
        /// Type that failed to encode.
        source_type: &'static str,
        /// Underlying encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// An erased value held a different type than the route expected.
    #[error("expected a value of type `{expected}`, found `{actual}`")]
    TypeMismatch {
        /// Type the route expected.
        expected: &'static str,
        /// Type actually present.
        actual: &'static str,
    },
}

/// Errors that can occur while executing a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler is registered for the request type.
    #[error("no handler registered for `{0}`")]
    NoHandler(&'static str),

    /// The caller cancelled the operation.
    #[error("operation was cancelled")]
    Cancelled,

    /// A publish was attempted outside of a Tokio runtime.
    #[error("publishing requires a running Tokio runtime")]
    NoRuntime,

    /// The isolated resolution scope could not be created.
    #[error("failed to create a resolution scope: {0}")]
    ScopeCreation(#[source] BoxError),

    /// One or more concurrently running handlers failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Collection of failures from concurrently running handlers.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<BoxError>,
}

impl AggregateError {
    /// Wraps the collected failures.
    pub fn new(errors: Vec<BoxError>) -> Self {
        Self { errors }
    }

    /// Individual failures, in completion order.
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    /// Number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the aggregate and returns the failures.
    pub fn into_errors(self) -> Vec<BoxError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} handler(s) failed", self.errors.len())?;
        for err in &self.errors {
            write!(f, "; {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("custom")]
    struct Custom;

    #[test]
    fn from_boxed_unwraps_known_errors() {
        let boxed: BoxError = Box::new(RoutingError::NotFound("a".into()));
        assert!(matches!(
            CourierError::from_boxed(boxed),
            CourierError::Routing(RoutingError::NotFound(key)) if key == "a"
        ));

        let boxed: BoxError = Box::new(CourierError::Dispatch(DispatchError::Cancelled));
        assert!(CourierError::from_boxed(boxed).is_cancelled());
    }

    #[test]
    fn from_boxed_keeps_foreign_errors_as_handler_errors() {
        let err = CourierError::from_boxed(Box::new(Custom));
        assert!(err.handler_error::<Custom>().is_some());
        assert_eq!(err.to_string(), "custom");
    }

    #[test]
    fn aggregate_lists_failures() {
        let err = AggregateError::new(vec![Box::new(Custom), Box::new(Custom)]);
        assert_eq!(err.len(), 2);
        assert_eq!(err.to_string(), "2 handler(s) failed; custom; custom");
    }
}
