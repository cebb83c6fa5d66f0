//! # Keyed Routing
//!
//! Binds string keys to payload types and dispatches neutral values to them.
//!
//! - [`Candidate`]: a payload type offered for registration
//! - [`DescriptorFactory`]: eligibility checks and descriptor creation
//! - [`ServiceRegistry`] / [`ListenerRegistry`]: key lookup tables
//! - [`FilterChain`]: filters around the terminal dispatch
//! - [`translate`]: conversions through the neutral JSON form

mod candidate;
mod descriptor;
mod factory;
mod filter_chain;
mod registry;
pub mod translate;

#[cfg(feature = "inventory")]
mod collected;

pub use candidate::{Candidate, Capabilities};
pub use descriptor::{RouteDescriptor, RouteKind};
pub use factory::{DescriptorFactory, Destination};
pub use filter_chain::FilterChain;
pub use registry::{ListenerRegistry, RegistrationOptions, ServiceRegistry};

#[cfg(feature = "inventory")]
pub use collected::{CandidateRegistration, scan};
