//! Subscription request and response contracts.

use crate::{BoxResource, Node, ResourceVersion, TypeTag};

/// A subscription request for one resource type.
///
/// Carries the node descriptor, the type being watched, an optional list of
/// requested resource names (empty means "all of this type"), and the last
/// version the client successfully acknowledged (empty for a fresh client).
#[derive(Clone, Debug)]
pub struct Request {
    /// Descriptor of the requesting node.
    pub node: Node,
    /// Resource category being subscribed to.
    pub type_tag: TypeTag,
    /// Requested resource names; empty requests everything of this type.
    pub resource_names: Vec<String>,
    /// Last version acknowledged by the client.
    pub version: ResourceVersion,
}

impl Request {
    /// Create a request for all resources of a type, from a fresh client.
    #[must_use]
    pub fn new(node: Node, type_tag: impl Into<TypeTag>) -> Self {
        Self {
            node,
            type_tag: type_tag.into(),
            resource_names: Vec::new(),
            version: ResourceVersion::empty(),
        }
    }

    /// Restrict the request to the given resource names.
    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the last acknowledged version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<ResourceVersion>) -> Self {
        self.version = version.into();
        self
    }
}

/// A delivered configuration update.
///
/// Carries a copy of the originating request, the version being delivered
/// (the snapshot's version for the watched type, not the request's), and the
/// selected resources in unspecified order.
#[derive(Clone, Debug)]
pub struct Response {
    /// The request this response answers.
    pub request: Request,
    /// Version of the delivered resources.
    pub version: ResourceVersion,
    /// The selected resources; order is unspecified.
    pub resources: Vec<BoxResource>,
}

impl Response {
    /// Names of the delivered resources, in delivery order.
    #[must_use]
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.name()).collect()
    }
}
