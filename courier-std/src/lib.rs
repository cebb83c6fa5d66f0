//! # courier-std
//!
//! Standard implementations for the Courier dispatch framework.
//!
//! This crate provides:
//! - **Typed dispatch**: [`Mediator`](mediator::Mediator) with behavior pipelines
//! - **Pipelines**: [`PipelineResolver`](pipeline::PipelineResolver)
//! - **Services**: [`Container`](container::Container) and per-publish scopes
//! - **Keyed routing**: registries, filter chains and translation in [`routing`]
//! - **Client**: [`DispatchClient`](client::DispatchClient) for send and publish
//! - **Ambient context**: [`ambient`]
//! - **Standard behaviors and filters**: Logging, Validation, Authorization, Timeout

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use courier_core;

// Modules
pub mod ambient;
pub mod behaviors;
pub mod client;
pub mod container;
pub mod filters;
pub mod mediator;
pub mod pipeline;
pub mod routing;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
