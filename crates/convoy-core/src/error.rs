//! Error types for cache operations.
//!
//! This module provides [`ConvoyError`], the error type shared by the cache
//! and the trait implementations plugged into it. Variants convert to
//! [`tonic::Status`] so a discovery server can surface them on its streams.

/// Error type for cache operations.
///
/// Two variants are flow control rather than failures: [`SkipFetch`] tells
/// the caller the client is already current and nothing should be sent, and
/// a suppressed aggregated response is not reported at all.
///
/// [`SkipFetch`]: ConvoyError::SkipFetch
#[derive(Debug, thiserror::Error)]
pub enum ConvoyError {
    /// No snapshot has been stored under this node key.
    #[error("no snapshot found for node {node_id}")]
    SnapshotNotFound {
        /// The node key that was looked up.
        node_id: String,
    },

    /// A fetch hit a node that has never received a snapshot.
    #[error("missing snapshot for {node_id}")]
    MissingSnapshot {
        /// The node key derived from the request.
        node_id: String,
    },

    /// The fetched version is already current; the caller should not reply.
    #[error("fetch skipped: client version is current")]
    SkipFetch,

    /// A cross-type reference in a snapshot does not resolve.
    #[error("inconsistent snapshot: {type_tag}/{name} is not listed by {referenced_by}")]
    InconsistentSnapshot {
        /// Type tag of the dangling resource.
        type_tag: String,
        /// Name of the dangling resource.
        name: String,
        /// Type tag that was expected to list the name.
        referenced_by: String,
    },

    /// A resource failed to encode to its wire form.
    #[error("encoding error for {type_tag}: {message}")]
    EncodingError {
        /// Type tag of the resource being encoded.
        type_tag: String,
        /// Error message.
        message: String,
    },

    /// Unexpected internal error, for use by `Snapshot` and `Resource`
    /// implementations outside this workspace.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConvoyError {
    /// Create an internal error from any error type.
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an encoding error for a resource type.
    pub fn encoding(type_tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EncodingError {
            type_tag: type_tag.into(),
            message: message.into(),
        }
    }

    /// Whether this is the "client is already current" fetch outcome.
    #[must_use]
    pub fn is_skip_fetch(&self) -> bool {
        matches!(self, Self::SkipFetch)
    }
}

/// Convert to tonic::Status for gRPC responses.
///
/// `SkipFetch` maps to `Ok` because it is flow control, not a failure.
impl From<ConvoyError> for tonic::Status {
    fn from(err: ConvoyError) -> Self {
        match &err {
            ConvoyError::SnapshotNotFound { .. } | ConvoyError::MissingSnapshot { .. } => {
                tonic::Status::not_found(err.to_string())
            }
            ConvoyError::SkipFetch => tonic::Status::ok(err.to_string()),
            ConvoyError::InconsistentSnapshot { .. } => {
                tonic::Status::failed_precondition(err.to_string())
            }
            ConvoyError::EncodingError { .. } => tonic::Status::invalid_argument(err.to_string()),
            ConvoyError::Internal { .. } => tonic::Status::internal(err.to_string()),
        }
    }
}
