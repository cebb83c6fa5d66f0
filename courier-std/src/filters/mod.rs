//! Standard filters.
//!
//! - [`LoggingFilter`]: logs each keyed send
//! - [`TimeoutFilter`]: bounds the time spent in the rest of the chain

mod logging;
mod timeout;

pub use logging::LoggingFilter;
pub use timeout::{FilterTimeout, TimeoutFilter};
