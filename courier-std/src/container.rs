//! # Service Container
//!
//! A small resolver with three lifetimes:
//!
//! - **singleton**: one shared instance
//! - **scoped**: one instance per [`Scope`], created on first use
//! - **transient**: a fresh instance per lookup
//!
//! Behaviors are registered as transients under their [`BehaviorKey`].
//! The [`Container`] itself resolves through a root scope and opens child
//! scopes through [`ScopeFactory`].

use courier_core::{
    Behavior, BehaviorId, BehaviorKey, BehaviorSlot, BoxError, Request, Resolver, ScopeFactory,
    ServiceKey,
};
use dashmap::DashMap;
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&dyn Resolver) -> Instance + Send + Sync>;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

enum Registration {
    Singleton(Instance),
    Scoped(Factory),
    Transient(Factory),
}

struct Entry {
    name: &'static str,
    registration: Registration,
}

/// Builder for [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    entries: HashMap<ServiceKey, Entry>,
}

impl ContainerBuilder {
    fn insert(&mut self, key: ServiceKey, name: &'static str, registration: Registration) {
        if self
            .entries
            .insert(key, Entry { name, registration })
            .is_some()
        {
            tracing::debug!(service = name, "service registration replaced");
        }
    }

    /// Registers a shared instance of `T`.
    pub fn singleton<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.insert(
            ServiceKey::of::<T>(),
            type_name::<T>(),
            Registration::Singleton(Arc::new(value)),
        );
        self
    }

    /// Registers `T`, created once per scope.
    pub fn scoped<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.insert(
            ServiceKey::of::<T>(),
            type_name::<T>(),
            Registration::Scoped(Arc::new(move |resolver: &dyn Resolver| -> Instance {
                Arc::new(factory(resolver))
            })),
        );
        self
    }

    /// Registers `T`, created on every lookup.
    pub fn transient<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn Resolver) -> T + Send + Sync + 'static,
    {
        self.insert(
            ServiceKey::of::<T>(),
            type_name::<T>(),
            Registration::Transient(Arc::new(move |resolver: &dyn Resolver| -> Instance {
                Arc::new(factory(resolver))
            })),
        );
        self
    }

    /// Registers the behavior `id` for request `R`.
    pub fn behavior<R, B, F>(mut self, id: BehaviorId, factory: F) -> Self
    where
        R: Request,
        B: Behavior<R>,
        F: Fn(&dyn Resolver) -> B + Send + Sync + 'static,
    {
        self.insert(
            ServiceKey::Behavior(BehaviorKey::of::<R>(id)),
            type_name::<B>(),
            Registration::Transient(Arc::new(move |resolver: &dyn Resolver| -> Instance {
                Arc::new(BehaviorSlot::<R>::new(factory(resolver)))
            })),
        );
        self
    }

    /// Finalizes the container.
    pub fn build(self) -> Container {
        let entries = Arc::new(self.entries);
        Container {
            root: Arc::new(Scope::new(Arc::clone(&entries))),
            entries,
        }
    }
}

/// Root service container.
///
/// Cloning is cheap and shares the root scope.
#[derive(Clone)]
pub struct Container {
    entries: Arc<HashMap<ServiceKey, Entry>>,
    root: Arc<Scope>,
}

impl Container {
    /// Starts building a container.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Opens a new scope.
    pub fn scope(&self) -> Scope {
        Scope::new(Arc::clone(&self.entries))
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Resolver for Container {
    fn resolve_any(&self, key: &ServiceKey) -> Option<Instance> {
        self.root.resolve_any(key)
    }
}

impl ScopeFactory for Container {
    fn create_scope(&self) -> Result<Arc<dyn Resolver>, BoxError> {
        Ok(Arc::new(self.scope()))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.entries.values().map(|e| e.name).collect::<Vec<_>>())
            .finish()
    }
}

/// An isolated set of scoped instances.
///
/// Scoped instances are dropped together with the scope.
pub struct Scope {
    id: u64,
    entries: Arc<HashMap<ServiceKey, Entry>>,
    instances: DashMap<ServiceKey, Instance>,
}

impl Scope {
    fn new(entries: Arc<HashMap<ServiceKey, Entry>>) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(scope = id, "scope opened");
        Self {
            id,
            entries,
            instances: DashMap::new(),
        }
    }

    /// Identifier of this scope.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of scoped instances created so far.
    pub fn instances(&self) -> usize {
        self.instances.len()
    }
}

impl Resolver for Scope {
    fn resolve_any(&self, key: &ServiceKey) -> Option<Instance> {
        let entry = self.entries.get(key)?;
        match &entry.registration {
            Registration::Singleton(instance) => Some(Arc::clone(instance)),
            Registration::Transient(factory) => Some(factory(self)),
            Registration::Scoped(factory) => {
                if let Some(existing) = self.instances.get(key) {
                    return Some(Arc::clone(existing.value()));
                }
                // Built outside the map lock: factories may resolve from this scope.
                let created = factory(self);
                Some(Arc::clone(
                    self.instances.entry(*key).or_insert(created).value(),
                ))
            }
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        tracing::trace!(scope = self.id, instances = self.instances.len(), "scope disposed");
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}
