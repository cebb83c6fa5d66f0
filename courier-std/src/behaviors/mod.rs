//! Standard behaviors.
//!
//! - [`LoggingBehavior`]: logs each request and its outcome
//! - [`ValidationBehavior`]: rejects requests that fail a [`Validator`]
//! - [`AuthorizationBehavior`]: rejects requests an [`Authorizer`] denies

mod authorization;
mod logging;
mod validation;

pub use authorization::{Authorization, AuthorizationBehavior, Authorizer, Unauthorized};
pub use logging::LoggingBehavior;
pub use validation::{ValidationBehavior, ValidationFailed, ValidationFailure, Validator};
