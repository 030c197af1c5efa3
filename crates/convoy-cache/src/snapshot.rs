//! Snapshot: immutable, per-type versioned bundle of resources.
//!
//! A snapshot is everything the control plane wants one node to apply,
//! grouped by resource type, with a version tag per type. Snapshots are
//! values: once handed to the cache they must never be mutated, and
//! [`Snapshot::with_version`] produces a new snapshot rather than editing in
//! place. Different types from the same snapshot may reach the proxy in
//! arbitrary order on separate streams, which is why producers must only
//! install snapshots whose cross-type references resolve
//! ([`Snapshot::consistent`]).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use convoy_core::{BoxResource, ConvoyError, ConvoyResult, ResourceVersion, TypeTag};

/// Capability trait for snapshots.
///
/// The cache is parameterized over this trait and never over a concrete
/// resource family; any type that can present versioned, name-keyed resource
/// maps per type tag can be distributed. [`SimpleSnapshot`] is the
/// ready-made implementation.
pub trait Snapshot: Send + Sync + fmt::Debug {
    /// The resource types this snapshot carries.
    fn supported_types(&self) -> Vec<TypeTag>;

    /// Verify that every cross-type reference the snapshot declares resolves
    /// to a present name.
    ///
    /// The cache does not call this; producers are expected to establish
    /// consistency before installing a snapshot.
    fn consistent(&self) -> ConvoyResult<()>;

    /// Resources of one type, keyed by name. Unknown types yield an empty
    /// map.
    fn resources(&self, type_tag: &TypeTag) -> HashMap<String, BoxResource>;

    /// Version of one type. Unknown types yield the empty version.
    fn version(&self, type_tag: &TypeTag) -> ResourceVersion;

    /// A new snapshot equal to this one except for `type_tag`'s version.
    fn with_version(&self, type_tag: &TypeTag, version: ResourceVersion) -> Arc<dyn Snapshot>;
}

/// Resources of a single type within a [`SimpleSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct TypedResources {
    version: ResourceVersion,
    items: HashMap<String, BoxResource>,
}

impl TypedResources {
    /// Create an empty collection at the given version.
    #[must_use]
    pub fn new(version: impl Into<ResourceVersion>) -> Self {
        Self {
            version: version.into(),
            items: HashMap::new(),
        }
    }

    /// Version of this resource type.
    #[inline]
    #[must_use]
    pub fn version(&self) -> &ResourceVersion {
        &self.version
    }

    /// Number of resources.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no resources.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a resource by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxResource> {
        self.items.get(name)
    }

    /// Iterate over all resources.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BoxResource)> {
        self.items.iter()
    }

    /// All resource names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }

    fn insert(&mut self, resource: BoxResource) {
        self.items.insert(resource.name().to_string(), resource);
    }
}

/// A snapshot backed by plain maps, with declared inter-type dependencies.
///
/// A dependency `(parent, child)` states that every resource stored under
/// `child` must be named by a resource under `parent`: every endpoint group
/// is named by some cluster, every route table by some listener.
/// [`SimpleSnapshot::consistent`] verifies all declared dependencies.
#[derive(Debug, Clone, Default)]
pub struct SimpleSnapshot {
    resources: HashMap<TypeTag, TypedResources>,
    dependencies: Vec<(TypeTag, TypeTag)>,
}

impl SimpleSnapshot {
    /// Create a snapshot builder.
    #[must_use]
    pub fn builder() -> SimpleSnapshotBuilder {
        SimpleSnapshotBuilder::default()
    }

    /// Create a snapshot carrying a single resource type.
    #[must_use]
    pub fn single(
        type_tag: impl Into<TypeTag>,
        version: impl Into<ResourceVersion>,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        Self::builder()
            .resources_with_version(type_tag, version, resources)
            .build()
    }

    /// Total number of resources across all types.
    #[must_use]
    pub fn total_resources(&self) -> usize {
        self.resources.values().map(TypedResources::len).sum()
    }

    /// Typed view of one resource category, if present.
    #[must_use]
    pub fn typed_resources(&self, type_tag: &TypeTag) -> Option<&TypedResources> {
        self.resources.get(type_tag)
    }
}

impl Snapshot for SimpleSnapshot {
    fn supported_types(&self) -> Vec<TypeTag> {
        self.resources.keys().cloned().collect()
    }

    fn consistent(&self) -> ConvoyResult<()> {
        for (parent, child) in &self.dependencies {
            let named: HashSet<&str> = self
                .resources
                .get(parent)
                .map(|r| r.names().map(String::as_str).collect())
                .unwrap_or_default();

            if let Some(children) = self.resources.get(child) {
                for name in children.names() {
                    if !named.contains(name.as_str()) {
                        return Err(ConvoyError::InconsistentSnapshot {
                            type_tag: child.to_string(),
                            name: name.clone(),
                            referenced_by: parent.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn resources(&self, type_tag: &TypeTag) -> HashMap<String, BoxResource> {
        self.resources
            .get(type_tag)
            .map(|r| r.items.clone())
            .unwrap_or_default()
    }

    fn version(&self, type_tag: &TypeTag) -> ResourceVersion {
        self.resources
            .get(type_tag)
            .map(|r| r.version.clone())
            .unwrap_or_default()
    }

    fn with_version(&self, type_tag: &TypeTag, version: ResourceVersion) -> Arc<dyn Snapshot> {
        let mut next = self.clone();
        next.resources
            .entry(type_tag.clone())
            .or_default()
            .version = version;
        Arc::new(next)
    }
}

/// Builder for [`SimpleSnapshot`].
#[derive(Debug, Default)]
pub struct SimpleSnapshotBuilder {
    version: ResourceVersion,
    resources: HashMap<TypeTag, TypedResources>,
    dependencies: Vec<(TypeTag, TypeTag)>,
}

impl SimpleSnapshotBuilder {
    /// Set the default version applied to types added without an explicit
    /// one.
    #[must_use]
    pub fn version(mut self, version: impl Into<ResourceVersion>) -> Self {
        self.version = version.into();
        self
    }

    /// Add resources of one type at the default version.
    #[must_use]
    pub fn resources(
        self,
        type_tag: impl Into<TypeTag>,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        let version = self.version.clone();
        self.resources_with_version(type_tag, version, resources)
    }

    /// Add resources of one type at an explicit version.
    #[must_use]
    pub fn resources_with_version(
        mut self,
        type_tag: impl Into<TypeTag>,
        version: impl Into<ResourceVersion>,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        let mut typed = TypedResources::new(version);
        for resource in resources {
            typed.insert(resource);
        }
        self.resources.insert(type_tag.into(), typed);
        self
    }

    /// Add a single resource, creating its type at the default version.
    #[must_use]
    pub fn resource(mut self, type_tag: impl Into<TypeTag>, resource: BoxResource) -> Self {
        let entry = self
            .resources
            .entry(type_tag.into())
            .or_insert_with(|| TypedResources::new(self.version.clone()));
        entry.insert(resource);
        self
    }

    /// Declare that every resource under `child` must be named by a resource
    /// under `parent`.
    #[must_use]
    pub fn dependency(mut self, parent: impl Into<TypeTag>, child: impl Into<TypeTag>) -> Self {
        self.dependencies.push((parent.into(), child.into()));
        self
    }

    /// Build the snapshot.
    #[must_use]
    pub fn build(self) -> SimpleSnapshot {
        SimpleSnapshot {
            resources: self.resources,
            dependencies: self.dependencies,
        }
    }
}
