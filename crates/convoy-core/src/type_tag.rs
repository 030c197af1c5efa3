//! Resource category tags.

use std::fmt;

/// Opaque tag naming one category of configuration resources.
///
/// The cache compares tags by equality and never interprets them. The
/// constants below cover the conventional discovery categories; any other
/// string is an equally valid tag.
///
/// # Example
///
/// ```rust
/// use convoy_core::TypeTag;
///
/// let tag = TypeTag::new(TypeTag::CLUSTER);
/// assert_eq!(tag.as_str(), "cluster");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(String);

impl TypeTag {
    /// Tag for upstream cluster definitions.
    pub const CLUSTER: &'static str = "cluster";

    /// Tag for endpoint groups, each named by a cluster.
    pub const ENDPOINT: &'static str = "endpoint";

    /// Tag for listeners.
    pub const LISTENER: &'static str = "listener";

    /// Tag for route tables, each named by a listener.
    pub const ROUTE: &'static str = "route";

    /// Tag for transport secrets.
    pub const SECRET: &'static str = "secret";

    /// Create a tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<TypeTag> for String {
    fn from(t: TypeTag) -> Self {
        t.0
    }
}

impl AsRef<str> for TypeTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
