//! Service resolution seams.
//!
//! Dispatch never constructs behaviors or services itself; it asks a
//! [`Resolver`]. A [`ScopeFactory`] hands out isolated resolvers, one per
//! publish occurrence.

use crate::behavior::{BehaviorKey, BehaviorSlot, DynBehavior};
use crate::error::BoxError;
use crate::message::Request;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Key under which a resolver stores an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// A plain service of the given type.
    Type(TypeId),
    /// A behavior closed over a request type.
    Behavior(BehaviorKey),
}

impl ServiceKey {
    /// Key of a plain service of type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::Type(TypeId::of::<T>())
    }
}

/// Looks up service instances.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Resolver",
    label = "missing `Resolver` implementation",
    note = "Resolvers must implement `resolve_any`."
)]
pub trait Resolver: Send + Sync {
    /// Returns the instance registered under `key`, if any.
    fn resolve_any(&self, key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Typed lookups on top of [`Resolver`].
pub trait ResolverExt: Resolver {
    /// Resolves a service of type `T`.
    fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve_any(&ServiceKey::of::<T>())?.downcast::<T>().ok()
    }

    /// Resolves the behavior registered under `key` for `R`.
    fn resolve_behavior<R: Request>(&self, key: &BehaviorKey) -> Option<Arc<dyn DynBehavior<R>>> {
        let slot = self
            .resolve_any(&ServiceKey::Behavior(*key))?
            .downcast::<BehaviorSlot<R>>()
            .ok()?;
        Some(Arc::clone(&slot.0))
    }
}

impl<T: Resolver + ?Sized> ResolverExt for T {}

/// Creates isolated resolution scopes.
pub trait ScopeFactory: Send + Sync {
    /// Opens a new scope; it is released when the returned handle is dropped.
    fn create_scope(&self) -> Result<Arc<dyn Resolver>, BoxError>;
}

/// A resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResolver;

impl Resolver for EmptyResolver {
    fn resolve_any(&self, _key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }
}
