//! # Courier Core
//!
//! Core traits for the Courier dispatch framework.
//!
//! This crate defines the vocabulary shared by every other Courier crate.
//! Concrete dispatchers, registries and the keyed client live in
//! `courier-std`.
//!
//! ## Messages ([`Request`], [`Notification`])
//!
//! A request is answered by exactly one [`RequestHandler`]. A notification is
//! observed by any number of [`NotificationHandler`]s.
//!
//! ## Behaviors ([`Behavior`])
//!
//! Ordered stages wrapped around a request handler, declared per request type
//! and resolved by [`BehaviorKey`] through a [`Resolver`].
//!
//! ## Filters ([`Filter`])
//!
//! Stages wrapped around the terminal dispatch of a keyed route. They operate
//! on a [`RequestContext`] and an erased [`Payload`].
//!
//! ## Routing metadata ([`Routable`])
//!
//! Service paths and listen keys carried by payload types.
//!
//! # Error Types
//!
//! - [`CourierError`] - Top-level error type
//! - [`ConfigError`] - Registration errors
//! - [`RoutingError`] - Unknown keys
//! - [`TranslateError`] - Payload conversion errors
//! - [`DispatchError`] - Execution errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod context;
mod error;
mod filter;
mod handler;
mod message;
mod payload;
mod resolver;
mod routable;

// Re-exports
pub use behavior::{Behavior, BehaviorId, BehaviorKey, BehaviorSlot, DynBehavior, Next};
pub use context::{Headers, PublishContext, RequestContext};
pub use error::{
    AggregateError, BoxError, ConfigError, CourierError, DispatchError, Ineligibility,
    RoutingError, TranslateError,
};
pub use filter::{DynFilter, Filter, FilterNext, FilterType, Terminal};
pub use handler::{DynNotificationHandler, DynRequestHandler, NotificationHandler, RequestHandler};
pub use message::{Message, Notification, Request};
pub use payload::{Payload, TypeInfo};
pub use resolver::{EmptyResolver, Resolver, ResolverExt, ScopeFactory, ServiceKey};
pub use routable::Routable;
