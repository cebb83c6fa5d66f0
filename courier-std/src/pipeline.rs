//! # Behavior Pipelines
//!
//! Resolves the ordered behaviors declared by a request type, caches the
//! result per request/response pair, and runs a request through them.
//!
//! Execution is onion-style: the first declared behavior is the outermost one.
//! A behavior that cannot be resolved from the current [`Resolver`] is skipped.

use courier_core::{
    BehaviorKey, BoxError, DispatchError, DynRequestHandler, Next, Request, Resolver, ResolverExt,
};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;

/// Cache of closed behavior keys per request/response pair.
#[derive(Debug, Default)]
pub struct PipelineResolver {
    cache: DashMap<(TypeId, TypeId), Arc<[BehaviorKey]>>,
}

impl PipelineResolver {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the behaviors of `R`, outermost first.
    ///
    /// The list is computed once per request/response pair; concurrent first
    /// calls may both compute it, but only one result is kept.
    pub fn resolve<R: Request>(&self) -> Arc<[BehaviorKey]> {
        let key = (TypeId::of::<R>(), TypeId::of::<R::Response>());
        if let Some(found) = self.cache.get(&key) {
            return Arc::clone(found.value());
        }

        let resolved: Arc<[BehaviorKey]> = R::behaviors()
            .iter()
            .map(|id| BehaviorKey::of::<R>(*id))
            .collect();
        Arc::clone(self.cache.entry(key).or_insert(resolved).value())
    }

    /// Number of cached request/response pairs.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Runs `request` through its behaviors and finally `handler`.
    pub async fn execute<R: Request>(
        &self,
        request: R,
        resolver: &dyn Resolver,
        handler: &dyn DynRequestHandler<R>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, BoxError> {
        let keys = self.resolve::<R>();
        if keys.is_empty() {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled.into());
            }
            return handler.handle_dyn(request, cancel).await;
        }
        walk(&keys, resolver, handler, cancel).run(request).await
    }
}

fn walk<'a, R: Request>(
    keys: &'a [BehaviorKey],
    resolver: &'a dyn Resolver,
    handler: &'a dyn DynRequestHandler<R>,
    cancel: &'a CancellationToken,
) -> Next<'a, R> {
    Next::new(cancel.clone(), move |request: R| {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled.into());
            }

            let mut rest = keys;
            while let Some((key, tail)) = rest.split_first() {
                rest = tail;
                match resolver.resolve_behavior::<R>(key) {
                    Some(behavior) => {
                        return behavior
                            .handle_dyn(request, walk(rest, resolver, handler, cancel))
                            .await;
                    }
                    None => {
                        if tracing::enabled!(Level::TRACE) {
                            tracing::trace!(
                                request = key.request_name(),
                                behavior = key.behavior(),
                                "behavior not resolvable, skipping"
                            );
                        }
                    }
                }
            }
            handler.handle_dyn(request, cancel).await
        })
    })
}
