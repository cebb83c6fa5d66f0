//! Client and publish options.

use courier_core::{AggregateError, Headers, PublishContext};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Client-wide settings.
///
/// Deserializable so hosts can load it from their own configuration.
///
/// ```rust,ignore
/// let options: ClientOptions = serde_json::from_str(r#"{
///     "ignore_duplicate_routes": true,
///     "default_headers": { "source": "billing" }
/// }"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Skip duplicate service keys at build time instead of failing.
    pub ignore_duplicate_routes: bool,
    /// Headers attached to every publish, overridden by per-publish headers.
    pub default_headers: Headers,
}

/// Hook run around a publish occurrence.
pub type PublishHook = Arc<dyn Fn(&Value, &PublishContext) + Send + Sync>;

/// Hook run when listeners of a publish occurrence fail.
pub type PublishErrorHook = Arc<dyn Fn(&AggregateError, &Value, &PublishContext) + Send + Sync>;

/// Per-publish settings.
#[derive(Clone, Default)]
pub struct PublishOptions {
    pub(crate) headers: Headers,
    pub(crate) on_before: Option<PublishHook>,
    pub(crate) on_complete: Option<PublishHook>,
    pub(crate) on_error: Option<PublishErrorHook>,
}

impl PublishOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds several headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Runs before any listener is dispatched.
    pub fn on_before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &PublishContext) + Send + Sync + 'static,
    {
        self.on_before = Some(Arc::new(hook));
        self
    }

    /// Runs once every listener has been started.
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &PublishContext) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(hook));
        self
    }

    /// Runs after all listeners finished, if any of them failed.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AggregateError, &Value, &PublishContext) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for PublishOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishOptions")
            .field("headers", &self.headers)
            .field("on_before", &self.on_before.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
