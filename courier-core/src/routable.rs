//! Route metadata carried by payload types.

use crate::filter::FilterType;
use crate::message::Message;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A message type that can be reached by key.
///
/// `routes` are the service paths a request answers on; `listen_keys` are the
/// publish keys it listens to. `filters` are applied to every service route of
/// the type, after any filters supplied at registration.
///
/// Usually derived with `#[derive(Routable)]`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not Routable",
    label = "missing `Routable` implementation",
    note = "Routable types must be serde round-trippable and declare their keys."
)]
pub trait Routable: Message + Serialize + DeserializeOwned {
    /// Service paths, in declaration order.
    fn routes() -> &'static [&'static str] {
        &[]
    }

    /// Listen keys, in declaration order.
    fn listen_keys() -> &'static [&'static str] {
        &[]
    }

    /// Filters declared on the type, outermost first.
    fn filters() -> Vec<FilterType> {
        Vec::new()
    }
}
