//! # Ambient Publish Context
//!
//! Exposes the [`PublishContext`] of the publish occurrence that the current
//! task belongs to, without threading it through every call.
//!
//! The value lives in a Tokio task-local. Each occurrence runs its listeners
//! inside [`scope`]; tasks started with [`spawn`] or [`spawn_in`] inherit the
//! value their parent sees at spawn time, so concurrent occurrences never
//! observe each other's context.

use courier_core::PublishContext;
use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};

tokio::task_local! {
    static CURRENT: RefCell<Option<Arc<PublishContext>>>;
}

/// The context visible to the current task, if any.
pub fn current() -> Option<Arc<PublishContext>> {
    CURRENT
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Replaces the context seen by the current task and by tasks it spawns later.
///
/// Tasks already spawned keep their own value. Returns `false` when called
/// outside of any [`scope`], in which case nothing changes.
pub fn set(context: Option<Arc<PublishContext>>) -> bool {
    CURRENT
        .try_with(|slot| {
            *slot.borrow_mut() = context;
        })
        .is_ok()
}

/// Runs `future` with `context` as its ambient value.
pub fn scope<F: Future>(
    context: Option<Arc<PublishContext>>,
    future: F,
) -> impl Future<Output = F::Output> {
    CURRENT.scope(RefCell::new(context), future)
}

/// Spawns `future` on the runtime, inheriting the current context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(scope(current(), future))
}

/// Spawns `future` into `set`, inheriting the current context.
pub fn spawn_in<T, F>(set: &mut JoinSet<T>, future: F) -> AbortHandle
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    set.spawn(scope(current(), future))
}
