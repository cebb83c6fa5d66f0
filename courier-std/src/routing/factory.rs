//! Turns candidates into route descriptors.

use crate::routing::candidate::{Candidate, Capabilities};
use crate::routing::descriptor::{RouteDescriptor, RouteKind};
use courier_core::{ConfigError, FilterType, Ineligibility};
use std::sync::Arc;

/// Registry a candidate is being added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The service registry: one handler per route key.
    Services,
    /// The listener registry: any number of listeners per key.
    Listeners,
}

/// Builds descriptors from candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorFactory;

impl DescriptorFactory {
    /// Checks that `candidate` can be registered at `destination`.
    ///
    /// Services require a request type with at least one route; listeners
    /// require a request or notification type with at least one listen key.
    pub fn check_eligibility(
        candidate: &Candidate,
        destination: Destination,
    ) -> Result<(), ConfigError> {
        let ineligible = |reason| ConfigError::Ineligible {
            type_name: candidate.type_name(),
            reason,
        };
        match destination {
            Destination::Services => {
                if !candidate.capabilities().contains(Capabilities::REQUEST) {
                    return Err(ineligible(Ineligibility::MissingCapability {
                        expected: "Request",
                    }));
                }
                if candidate.routes().is_empty() {
                    return Err(ineligible(Ineligibility::MissingRoutes));
                }
            }
            Destination::Listeners => {
                if !candidate
                    .capabilities()
                    .intersects(Capabilities::REQUEST | Capabilities::NOTIFICATION)
                {
                    return Err(ineligible(Ineligibility::MissingCapability {
                        expected: "Request or Notification",
                    }));
                }
                if candidate.listen_keys().is_empty() {
                    return Err(ineligible(Ineligibility::MissingListenKeys));
                }
            }
        }
        Ok(())
    }

    /// Creates one descriptor per declared key.
    ///
    /// Service descriptors carry `explicit` filters followed by the filters
    /// declared on the type. Listener descriptors carry none. Nothing is created
    /// unless every key is valid.
    pub fn create_all(
        candidate: &Candidate,
        explicit: &[FilterType],
        destination: Destination,
    ) -> Result<Vec<RouteDescriptor>, ConfigError> {
        Self::check_eligibility(candidate, destination)?;

        let (keys, filters): (&[&str], Arc<[FilterType]>) = match destination {
            Destination::Services => (
                candidate.routes(),
                explicit.iter().chain(candidate.filters()).copied().collect(),
            ),
            Destination::Listeners => (candidate.listen_keys(), Arc::from([])),
        };
        if keys.iter().any(|key| key.is_empty()) {
            return Err(ConfigError::EmptyKey(candidate.type_name()));
        }

        let kind = if candidate.capabilities().contains(Capabilities::REQUEST) {
            RouteKind::Request
        } else {
            RouteKind::Notification
        };
        Ok(keys
            .iter()
            .map(|key| {
                RouteDescriptor::new(
                    key,
                    candidate.payload(),
                    kind,
                    Arc::clone(&filters),
                    Arc::clone(candidate.invoker()),
                )
            })
            .collect())
    }
}
