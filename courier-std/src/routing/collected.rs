//! Candidates submitted at link time through `inventory`.
//!
//! ```rust,ignore
//! courier::register_candidate!(request CreateOrder);
//! courier::register_candidate!(notification OrderShipped);
//!
//! let client = DispatchClient::builder(mediator, scopes)
//!     .scan(courier::scan())
//!     .build()?;
//! ```

use crate::routing::candidate::Candidate;

/// A registration entry collected by `inventory`.
pub struct CandidateRegistration {
    build: fn() -> Candidate,
}

impl CandidateRegistration {
    /// Creates an entry from a candidate constructor.
    pub const fn new(build: fn() -> Candidate) -> Self {
        Self { build }
    }

    /// Builds the candidate.
    pub fn candidate(&self) -> Candidate {
        (self.build)()
    }
}

inventory::collect!(CandidateRegistration);

/// Every candidate submitted anywhere in the program.
pub fn scan() -> Vec<Candidate> {
    let candidates: Vec<Candidate> = inventory::iter::<CandidateRegistration>
        .into_iter()
        .map(CandidateRegistration::candidate)
        .collect();
    tracing::debug!(candidates = candidates.len(), "scanned submitted candidates");
    candidates
}

/// Submits a payload type for [`scan`].
#[macro_export]
macro_rules! register_candidate {
    (request $ty:ty) => {
        $crate::inventory::submit! {
            $crate::routing::CandidateRegistration::new($crate::routing::Candidate::request::<$ty>)
        }
    };
    (notification $ty:ty) => {
        $crate::inventory::submit! {
            $crate::routing::CandidateRegistration::new($crate::routing::Candidate::notification::<$ty>)
        }
    };
}
