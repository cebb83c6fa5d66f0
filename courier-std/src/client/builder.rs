//! Builder for [`DispatchClient`].

use crate::client::{ClientOptions, DispatchClient};
use crate::mediator::Mediator;
use crate::routing::{Candidate, ListenerRegistry, RegistrationOptions, ServiceRegistry};
use courier_core::{ConfigError, FilterType, ScopeFactory};
use std::sync::Arc;

enum Pending {
    Route {
        candidate: Candidate,
        filters: Vec<FilterType>,
    },
    Listener(Candidate),
    Scan(Vec<Candidate>),
}

/// Collects registrations and builds a [`DispatchClient`].
///
/// Registrations are applied in the order they were added.
///
/// # Example
///
/// ```rust,ignore
/// let client = DispatchClient::builder(mediator, Arc::new(container))
///     .options(ClientOptions::default())
///     .route(Candidate::request::<GetOrder>())
///     .route_with_filters(Candidate::request::<PlaceOrder>(), [FilterType::of::<AuditFilter>()])
///     .listener(Candidate::notification::<OrderShipped>())
///     .build()?;
/// ```
pub struct ClientBuilder {
    mediator: Mediator,
    scopes: Arc<dyn ScopeFactory>,
    options: ClientOptions,
    pending: Vec<Pending>,
}

impl ClientBuilder {
    pub(crate) fn new(mediator: Mediator, scopes: Arc<dyn ScopeFactory>) -> Self {
        Self {
            mediator,
            scopes,
            options: ClientOptions::default(),
            pending: Vec::new(),
        }
    }

    /// Replaces the client options.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers the service routes of a request type.
    pub fn route(self, candidate: Candidate) -> Self {
        self.route_with_filters(candidate, [])
    }

    /// Registers the service routes of a request type, with filters that run
    /// before the type's own.
    pub fn route_with_filters<I>(mut self, candidate: Candidate, filters: I) -> Self
    where
        I: IntoIterator<Item = FilterType>,
    {
        self.pending.push(Pending::Route {
            candidate,
            filters: filters.into_iter().collect(),
        });
        self
    }

    /// Registers the listen keys of a request or notification type.
    pub fn listener(mut self, candidate: Candidate) -> Self {
        self.pending.push(Pending::Listener(candidate));
        self
    }

    /// Registers every candidate with every registry it is eligible for.
    pub fn scan<I>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.pending.push(Pending::Scan(candidates.into_iter().collect()));
        self
    }

    /// Applies every registration and builds the client.
    pub fn build(self) -> Result<DispatchClient, ConfigError> {
        let services = ServiceRegistry::new();
        let listeners = ListenerRegistry::new();
        let registration = RegistrationOptions {
            ignore_duplication: self.options.ignore_duplicate_routes,
        };

        for pending in self.pending {
            match pending {
                Pending::Route { candidate, filters } => {
                    services.add(&candidate, &filters, registration)?;
                }
                Pending::Listener(candidate) => {
                    listeners.add(&candidate)?;
                }
                Pending::Scan(candidates) => {
                    services.add_all(candidates.iter().cloned(), registration)?;
                    listeners.add_all(candidates)?;
                }
            }
        }

        tracing::info!(
            routes = services.len(),
            listen_keys = listeners.len(),
            "dispatch client built"
        );
        Ok(DispatchClient::from_parts(
            services,
            listeners,
            self.mediator,
            self.scopes,
            self.options,
        ))
    }
}
