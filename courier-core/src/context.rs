//! Per-operation context objects.

use crate::payload::TypeInfo;
use crate::resolver::Resolver;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Read-only string headers attached to a publish occurrence.
pub type Headers = HashMap<String, String>;

/// Context for a single keyed send.
///
/// Created immediately before the filter chain runs and dropped when the send
/// completes. Filters may stash values in [`RequestContext::items`].
pub struct RequestContext {
    id: String,
    path: String,
    payload_type: TypeInfo,
    result_type: Option<TypeInfo>,
    resolver: Arc<dyn Resolver>,
    cancellation: CancellationToken,
    items: HashMap<String, Value>,
}

impl RequestContext {
    /// Creates a context for `path` carrying a payload of `payload_type`.
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        payload_type: TypeInfo,
        resolver: Arc<dyn Resolver>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            payload_type,
            result_type: None,
            resolver,
            cancellation: CancellationToken::new(),
            items: HashMap::new(),
        }
    }

    /// Records the result type the caller asked for.
    pub fn with_result_type(mut self, result_type: TypeInfo) -> Self {
        self.result_type = Some(result_type);
        self
    }

    /// Replaces the cancellation signal.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Unique identifier of this send.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The route key being sent to.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type of the translated payload.
    pub fn payload_type(&self) -> TypeInfo {
        self.payload_type
    }

    /// Result type requested by the caller, if any.
    pub fn result_type(&self) -> Option<TypeInfo> {
        self.result_type
    }

    /// Resolver scoped to this send.
    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    /// Cancellation signal of this send.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Free-form values shared between filters.
    pub fn items(&self) -> &HashMap<String, Value> {
        &self.items
    }

    /// Mutable access to the shared values.
    pub fn items_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.items
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("payload_type", &self.payload_type)
            .field("result_type", &self.result_type)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

/// Metadata describing one publish occurrence.
///
/// Shared by every listener dispatched for that occurrence and visible through
/// the ambient accessor while they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishContext {
    id: String,
    key: String,
    timestamp: i64,
    headers: Arc<Headers>,
}

impl PublishContext {
    /// Creates the context of one occurrence.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        timestamp: i64,
        headers: Headers,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            timestamp,
            headers: Arc::new(headers),
        }
    }

    /// Unique identifier of the occurrence.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The listen key that was published.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Microseconds since the Unix epoch at creation.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// All headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// A single header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
