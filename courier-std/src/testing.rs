//! Testing utilities for Courier.
//!
//! This module provides helpers to observe pipelines, listeners and scopes in tests.
//!
//! # Features
//!
//! - [`TraceLog`]: A shared, ordered log of strings
//! - [`RecordingBehavior`]: A behavior that logs when it is entered and left
//! - [`RecordingListener`]: A notification handler that records what it receives
//! - [`TrackingScopes`]: A scope factory that counts opened and live scopes
//! - [`FailingScopes`]: A scope factory that always fails

use crate::ambient;
use courier_core::{
    Behavior, BoxError, Next, Notification, NotificationHandler, Request, Resolver, ScopeFactory,
};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, Weak,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Trace Log
// ============================================================================

/// A cloneable, ordered log shared between test doubles.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TraceLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    /// A copy of every entry, in order.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns `true` if nothing was logged.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

// ============================================================================
// Recording Behavior
// ============================================================================

/// A behavior that logs `"<name>-start"` before and `"<name>-end"` after the rest
/// of the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let log = TraceLog::new();
/// let container = Container::builder()
///     .behavior::<Ping, _, _>("outer", {
///         let log = log.clone();
///         move |_| RecordingBehavior::new("outer", log.clone())
///     })
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RecordingBehavior {
    name: &'static str,
    log: TraceLog,
}

impl RecordingBehavior {
    /// Create a behavior logging under `name`.
    pub fn new(name: &'static str, log: TraceLog) -> Self {
        Self { name, log }
    }
}

impl<R: Request> Behavior<R> for RecordingBehavior {
    async fn handle(&self, request: R, next: Next<'_, R>) -> Result<R::Response, BoxError> {
        self.log.push(format!("{}-start", self.name));
        let result = next.run(request).await;
        self.log.push(format!("{}-end", self.name));
        result
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// What a [`RecordingListener`] saw for one notification.
#[derive(Debug, Clone)]
pub struct Received<N> {
    /// The notification.
    pub notification: N,
    /// Id of the ambient publish context, if any.
    pub context_id: Option<String>,
    /// Key of the ambient publish context.
    pub key: Option<String>,
    /// Timestamp of the ambient publish context.
    pub timestamp: Option<i64>,
    /// Headers of the ambient publish context.
    pub headers: Vec<(String, String)>,
}

/// A notification handler that records every notification and the ambient
/// publish context it ran under.
pub struct RecordingListener<N> {
    received: Arc<Mutex<Vec<Received<N>>>>,
}

impl<N: Clone> RecordingListener<N> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A copy of everything received.
    pub fn received(&self) -> Vec<Received<N>> {
        lock(&self.received).clone()
    }

    /// Number of notifications received.
    pub fn count(&self) -> usize {
        lock(&self.received).len()
    }
}

impl<N: Clone> Default for RecordingListener<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for RecordingListener<N> {
    fn clone(&self) -> Self {
        Self {
            received: Arc::clone(&self.received),
        }
    }
}

impl<N: Notification> NotificationHandler<N> for RecordingListener<N> {
    async fn handle(&self, notification: N) -> Result<(), BoxError> {
        let context = ambient::current();
        let mut headers: Vec<(String, String)> = context
            .as_ref()
            .map(|c| c.headers().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        headers.sort();
        lock(&self.received).push(Received {
            notification,
            context_id: context.as_ref().map(|c| c.id().to_owned()),
            key: context.as_ref().map(|c| c.key().to_owned()),
            timestamp: context.map(|c| c.timestamp()),
            headers,
        });
        Ok(())
    }
}

// ============================================================================
// Scope Factories
// ============================================================================

/// A scope factory that records every scope it opens.
pub struct TrackingScopes {
    inner: Arc<dyn ScopeFactory>,
    opened: AtomicUsize,
    scopes: Mutex<Vec<Weak<dyn Resolver>>>,
}

impl TrackingScopes {
    /// Track scopes opened by `inner`.
    pub fn new(inner: Arc<dyn ScopeFactory>) -> Self {
        Self {
            inner,
            opened: AtomicUsize::new(0),
            scopes: Mutex::new(Vec::new()),
        }
    }

    /// Number of scopes opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of opened scopes that have not been released yet.
    pub fn live(&self) -> usize {
        lock(&self.scopes)
            .iter()
            .filter(|scope| scope.strong_count() > 0)
            .count()
    }
}

impl ScopeFactory for TrackingScopes {
    fn create_scope(&self) -> Result<Arc<dyn Resolver>, BoxError> {
        let scope = self.inner.create_scope()?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        lock(&self.scopes).push(Arc::downgrade(&scope));
        Ok(scope)
    }
}

/// Error produced by [`FailingScopes`].
#[derive(Debug, Clone, Copy, Error)]
#[error("scope creation refused")]
pub struct ScopeRefused;

/// A scope factory that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingScopes;

impl ScopeFactory for FailingScopes {
    fn create_scope(&self) -> Result<Arc<dyn Resolver>, BoxError> {
        Err(Box::new(ScopeRefused))
    }
}
