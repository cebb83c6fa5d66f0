//! # courier - Keyed Request/Notification Dispatch
//!
//! `courier` routes requests and notifications to in-process handlers, either
//! by type through a [`Mediator`] or by string key through a
//! [`DispatchClient`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[derive(Serialize, Deserialize, Request, Routable)]
//! #[request(response = String, behaviors("logging"))]
//! #[route("greet")]
//! struct Greet { name: String }
//!
//! let container = Container::builder()
//!     .behavior::<Greet, _, _>("logging", |_| LoggingBehavior)
//!     .build();
//! let mediator = Mediator::builder()
//!     .request_handler::<Greet, _>(|req: Greet| async move { Ok(format!("hi {}", req.name)) })
//!     .resolver(Arc::new(container.clone()))
//!     .build();
//! let client = DispatchClient::builder(mediator, Arc::new(container))
//!     .route(Candidate::request::<Greet>())
//!     .build()?;
//!
//! let reply: Option<String> = client.send("greet", &json!({ "name": "ada" })).await?;
//! ```
//!
//! ## Building Blocks
//!
//! - **Behaviors** wrap a request handler, declared per request type and
//!   resolved from a [`Resolver`] at dispatch time.
//! - **Filters** wrap the terminal dispatch of a keyed route.
//! - **Registries** map service paths to one request type, and listen keys to
//!   any number of listener types.
//! - **Publish** fans an event out to every listener concurrently, in one
//!   fresh scope, with its [`PublishContext`] visible through [`ambient`].
//!
//! ## Features
//!
//! - `macros`: derive `Message`, `Request`, `Notification` and `Routable`
//! - `inventory`: link-time candidate registration with [`register_candidate!`]
//!   and [`scan`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use courier_core::{
    // Errors
    AggregateError,
    // Behaviors
    Behavior,
    BehaviorId,
    BehaviorKey,
    BehaviorSlot,
    BoxError,
    ConfigError,
    CourierError,
    DispatchError,
    DynBehavior,
    // Filters
    DynFilter,
    // Handlers
    DynNotificationHandler,
    DynRequestHandler,
    // Resolution
    EmptyResolver,
    Filter,
    FilterNext,
    FilterType,
    // Context
    Headers,
    Ineligibility,
    // Messages
    Message,
    Next,
    Notification,
    NotificationHandler,
    // Payloads
    Payload,
    PublishContext,
    Request,
    RequestContext,
    RequestHandler,
    Resolver,
    ResolverExt,
    Routable,
    RoutingError,
    ScopeFactory,
    ServiceKey,
    Terminal,
    TranslateError,
    TypeInfo,
};

pub use courier_std::{
    ambient,
    client::{
        ClientBuilder, ClientOptions, DispatchClient, PublishErrorHook, PublishHandle,
        PublishHook, PublishOptions, PublishReport,
    },
    container::{Container, ContainerBuilder, Scope},
    mediator::{Mediator, MediatorBuilder},
    pipeline::PipelineResolver,
    routing::{
        Candidate, Capabilities, DescriptorFactory, Destination, FilterChain, ListenerRegistry,
        RegistrationOptions, RouteDescriptor, RouteKind, ServiceRegistry, translate,
    },
};

pub use serde_json::Value;
pub use tokio_util::sync::CancellationToken;

/// Standard behavior implementations.
pub mod behaviors {
    pub use courier_std::behaviors::{
        Authorization, AuthorizationBehavior, Authorizer, LoggingBehavior, Unauthorized,
        ValidationBehavior, ValidationFailed, ValidationFailure, Validator,
    };
}

/// Standard filter implementations.
pub mod filters {
    pub use courier_std::filters::{FilterTimeout, LoggingFilter, TimeoutFilter};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use courier_std::testing::*;
}

/// Prelude module - common imports for Courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core traits
        Behavior,
        // Errors
        BoxError,
        // Keyed dispatch
        Candidate,
        // Services
        Container,
        CourierError,
        DispatchClient,
        Filter,
        FilterNext,
        FilterType,
        // Typed dispatch
        Mediator,
        Message,
        Next,
        Notification,
        NotificationHandler,
        Payload,
        PublishContext,
        PublishOptions,
        Request,
        RequestContext,
        RequestHandler,
        Routable,
        ambient,
    };
}

#[cfg(feature = "macros")]
pub use courier_macros::{Message, Notification, Request, Routable};

#[cfg(feature = "inventory")]
pub use courier_std::{
    register_candidate,
    routing::{CandidateRegistration, scan},
};

#[cfg(feature = "inventory")]
pub use inventory;
