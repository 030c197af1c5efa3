//! Resource trait for configuration payloads.
//!
//! The cache stores and ships resources without inspecting their contents;
//! all it relies on is a name to key them by. [`Resource::encode`] exists for
//! the discovery server at the cache's boundary, which must marshal resources
//! onto the wire.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{ConvoyError, TypeTag};

/// A configuration resource the cache distributes.
///
/// Implement this trait for each concrete resource family. Resources are
/// shared immutably between the cache, in-flight responses, and consumers;
/// they must never be mutated once handed to a snapshot.
///
/// # Example
///
/// ```rust
/// use std::any::Any;
/// use convoy_core::{ConvoyError, Resource, TypeTag};
///
/// #[derive(Debug)]
/// struct Cluster {
///     name: String,
///     tag: TypeTag,
/// }
///
/// impl Resource for Cluster {
///     fn type_tag(&self) -> &TypeTag {
///         &self.tag
///     }
///
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn encode(&self) -> Result<prost_types::Any, ConvoyError> {
///         Ok(prost_types::Any {
///             type_url: self.tag.as_str().to_string(),
///             value: vec![], // actual encoding would go here
///         })
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// The category this resource belongs to.
    fn type_tag(&self) -> &TypeTag;

    /// The name the resource is keyed by, unique within its type.
    fn name(&self) -> &str;

    /// Encode the resource to its wire form.
    fn encode(&self) -> Result<prost_types::Any, ConvoyError>;

    /// Convert to `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a resource. Cloning is cheap and never copies the payload.
pub type BoxResource = Arc<dyn Resource>;

/// A resource wrapping a pre-encoded payload.
///
/// Useful when the producer already holds wire-format configuration and the
/// cache only needs to route it.
#[derive(Debug, Clone)]
pub struct AnyResource {
    type_tag: TypeTag,
    name: String,
    payload: prost_types::Any,
}

impl AnyResource {
    /// Create a resource from a pre-encoded payload.
    #[must_use]
    pub fn new(
        type_tag: impl Into<TypeTag>,
        name: impl Into<String>,
        payload: prost_types::Any,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            name: name.into(),
            payload,
        }
    }

    /// Get the inner payload.
    #[must_use]
    pub fn payload(&self) -> &prost_types::Any {
        &self.payload
    }

    /// Consume and return the inner payload.
    #[must_use]
    pub fn into_payload(self) -> prost_types::Any {
        self.payload
    }
}

impl Resource for AnyResource {
    fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<prost_types::Any, ConvoyError> {
        Ok(self.payload.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
