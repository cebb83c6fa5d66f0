//! # Route Registries
//!
//! - [`ServiceRegistry`]: route key to exactly one request descriptor
//! - [`ListenerRegistry`]: listen key to every listener descriptor
//!
//! Both are safe for concurrent use. Registration normally happens at startup,
//! but adding entries later is supported; lookups never block on writes to
//! unrelated keys.

use crate::routing::candidate::Candidate;
use crate::routing::descriptor::RouteDescriptor;
use crate::routing::factory::{DescriptorFactory, Destination};
use courier_core::{ConfigError, FilterType};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Options for service registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrationOptions {
    /// Keep the first registration of a key and skip later ones instead of failing.
    pub ignore_duplication: bool,
}

impl RegistrationOptions {
    /// Options that skip duplicate keys.
    pub fn ignore_duplicates() -> Self {
        Self {
            ignore_duplication: true,
        }
    }
}

/// Maps service route keys to their single request descriptor.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    routes: DashMap<String, RouteDescriptor>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every route declared by `candidate`.
    ///
    /// `filters` run before the filters declared on the type. Returns the number
    /// of keys added. A key that is already taken fails the call unless
    /// `options.ignore_duplication` is set, in which case it is skipped and the
    /// first registration stays. A failed call leaves the registry unchanged.
    pub fn add(
        &self,
        candidate: &Candidate,
        filters: &[FilterType],
        options: RegistrationOptions,
    ) -> Result<usize, ConfigError> {
        let descriptors = DescriptorFactory::create_all(candidate, filters, Destination::Services)?;

        let mut inserted: Vec<String> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let clash = match self.routes.entry(descriptor.key().to_owned()) {
                Entry::Occupied(existing) => {
                    let existing = existing.get().payload().name();
                    if options.ignore_duplication {
                        tracing::warn!(
                            key = descriptor.key(),
                            existing,
                            rejected = descriptor.payload().name(),
                            "duplicate route ignored"
                        );
                        None
                    } else {
                        Some(ConfigError::DuplicateRoute {
                            key: descriptor.key().to_owned(),
                            existing,
                            rejected: descriptor.payload().name(),
                        })
                    }
                }
                Entry::Vacant(slot) => {
                    tracing::debug!(
                        key = descriptor.key(),
                        payload = descriptor.payload().name(),
                        filters = descriptor.filters().len(),
                        "route registered"
                    );
                    inserted.push(descriptor.key().to_owned());
                    slot.insert(descriptor);
                    None
                }
            };

            if let Some(err) = clash {
                for key in &inserted {
                    self.routes.remove(key);
                }
                return Err(err);
            }
        }
        Ok(inserted.len())
    }

    /// Registers every eligible candidate; ineligible ones are skipped.
    ///
    /// Duplicate keys are still subject to `options`.
    pub fn add_all<I>(&self, candidates: I, options: RegistrationOptions) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut added = 0;
        for candidate in candidates {
            if let Err(reason) = DescriptorFactory::check_eligibility(&candidate, Destination::Services) {
                tracing::trace!(%reason, "candidate skipped for services");
                continue;
            }
            added += self.add(&candidate, &[], options)?;
        }
        Ok(added)
    }

    /// The descriptor registered under `key`.
    pub fn lookup(&self, key: &str) -> Option<RouteDescriptor> {
        self.routes.get(key).map(|entry| entry.value().clone())
    }

    /// Returns `true` if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    /// Every registered key.
    pub fn keys(&self) -> BTreeSet<String> {
        self.routes.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Maps listen keys to every descriptor listening on them.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: DashMap<String, Vec<RouteDescriptor>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `candidate` under each of its listen keys.
    ///
    /// Registering the same type twice produces two entries. Returns the number
    /// of entries added.
    pub fn add(&self, candidate: &Candidate) -> Result<usize, ConfigError> {
        let descriptors = DescriptorFactory::create_all(candidate, &[], Destination::Listeners)?;
        let added = descriptors.len();
        for descriptor in descriptors {
            tracing::debug!(
                key = descriptor.key(),
                payload = descriptor.payload().name(),
                "listener registered"
            );
            self.listeners
                .entry(descriptor.key().to_owned())
                .or_default()
                .push(descriptor);
        }
        Ok(added)
    }

    /// Registers every eligible candidate; ineligible ones are skipped.
    pub fn add_all<I>(&self, candidates: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut added = 0;
        for candidate in candidates {
            if let Err(reason) = DescriptorFactory::check_eligibility(&candidate, Destination::Listeners) {
                tracing::trace!(%reason, "candidate skipped for listeners");
                continue;
            }
            added += self.add(&candidate)?;
        }
        Ok(added)
    }

    /// Every descriptor listening on `key`, in registration order.
    pub fn lookup_all(&self, key: &str) -> Vec<RouteDescriptor> {
        self.listeners
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Every listen key.
    pub fn keys(&self) -> BTreeSet<String> {
        self.listeners.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of listen keys.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
