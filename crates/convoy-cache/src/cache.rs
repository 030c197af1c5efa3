//! The snapshot cache: per-node storage plus watch routing.
//!
//! [`SnapshotCache`] keeps the latest snapshot per node and the set of open
//! watches per node. Installing a snapshot wakes exactly the watches whose
//! acknowledged version no longer matches the stored version for their type.
//!
//! In aggregated mode all types for a node travel on one stream, so a
//! response naming resources the request did not ask for is held back:
//! shipping a superset would force the client to acknowledge a version whose
//! dependencies it never requested. Snapshots must then be internally
//! consistent so the client's follow-up request eventually names everything.
//! In non-aggregated mode (and for fetches) partial requests arrive on
//! separate streams and re-using the snapshot version per stream is fine, so
//! responses are never held back.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use tokio::sync::oneshot;
use tracing::{debug, info, trace};

use convoy_core::{
    BoxResource, ConvoyError, ConvoyResult, IdHash, NodeHash, Request, Response, ResourceVersion,
};

use crate::snapshot::Snapshot;
use crate::stats::CacheStats;
use crate::status::{StatusHandle, StatusInfo};
use crate::watch::{ResponseWatch, Watch, WatchId};

/// Subscription surface of the cache, as seen by a discovery server.
pub trait ConfigWatcher: Send + Sync {
    /// Open a watch for a request.
    ///
    /// If a stored snapshot is already ahead of the request's version the
    /// response is delivered synchronously and no cancel handle is returned;
    /// otherwise the watch is registered and the handle removes it.
    fn create_watch(&self, request: Request) -> (Watch, Option<WatchCancel>);

    /// One-shot read, never registering a watch.
    ///
    /// Returns [`ConvoyError::MissingSnapshot`] when the node has no
    /// snapshot, [`ConvoyError::SkipFetch`] when the client is already
    /// current.
    fn fetch(&self, request: &Request) -> ConvoyResult<Response>;
}

/// Full cache surface: subscription plus snapshot management and
/// introspection.
pub trait Cache: ConfigWatcher {
    /// Get the stored snapshot for a node.
    fn get_snapshot(&self, node_id: &str) -> ConvoyResult<Arc<dyn Snapshot>>;

    /// Install a snapshot for a node, waking every watch whose version went
    /// stale. Never fails.
    ///
    /// For aggregated delivery, snapshots should have distinct versions and
    /// be internally consistent; producers establish that before calling.
    fn set_snapshot(&self, node_id: &str, snapshot: Arc<dyn Snapshot>);

    /// Remove all snapshot and status information for a node. Open watches
    /// are dropped without delivery.
    fn clear_snapshot(&self, node_id: &str);

    /// Number of nodes with a stored snapshot.
    fn snapshot_count(&self) -> usize;

    /// Status handle for a node, if the node has ever opened a watch.
    fn get_status_info(&self, node_id: &str) -> Option<StatusHandle>;

    /// Keys of all nodes with status information.
    fn get_status_keys(&self) -> Vec<String>;
}

/// Snapshot cache keyed by node, with per-type versioned watch delivery.
///
/// Cloning the cache clones a handle to the same shared state, so producers
/// and the discovery server can each hold their own copy.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    /// Hold responses until all resources are named in the request.
    aggregated: bool,
    /// Collapses node descriptors to cache keys.
    hasher: Box<dyn NodeHash>,
    state: RwLock<CacheState>,
    stats: CacheStats,
}

#[derive(Debug, Default)]
struct CacheState {
    /// Latest snapshot per node; replaced wholesale on update.
    snapshots: HashMap<String, Arc<dyn Snapshot>>,
    /// Open-watch bookkeeping per node.
    status: HashMap<String, StatusHandle>,
}

impl SnapshotCache {
    /// Create a cache.
    ///
    /// `aggregated` delays responses until all resources in them are named
    /// in the request; it requires producers to install consistent
    /// snapshots. The hasher maps node descriptors to cache keys and must
    /// match how producers key [`Cache::set_snapshot`].
    #[must_use]
    pub fn new(aggregated: bool, hasher: impl NodeHash + 'static) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                aggregated,
                hasher: Box::new(hasher),
                state: RwLock::default(),
                stats: CacheStats::new(),
            }),
        }
    }

    /// Create a cache builder.
    #[must_use]
    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    /// Cache statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.inner.stats
    }

    /// The cache key for a node descriptor, under this cache's hasher.
    ///
    /// Producers can use this to key `set_snapshot` consistently with
    /// incoming requests.
    #[must_use]
    pub fn node_key(&self, node: &convoy_core::Node) -> String {
        self.inner.hasher.id(node)
    }

    fn register_watch(
        &self,
        info: &StatusInfo,
        node_id: String,
        request: Request,
        sender: oneshot::Sender<Response>,
    ) -> WatchCancel {
        let watch_id = WatchId::next();
        info!(
            watch = %watch_id,
            type_tag = %request.type_tag,
            names = ?request.resource_names,
            node = %node_id,
            version = %request.version,
            "opened watch"
        );
        info.insert_watch(watch_id, ResponseWatch { request, sender });
        self.inner.stats.record_watch_opened();
        WatchCancel {
            inner: Arc::clone(&self.inner),
            node_id,
            watch_id,
        }
    }
}

impl ConfigWatcher for SnapshotCache {
    fn create_watch(&self, request: Request) -> (Watch, Option<WatchCancel>) {
        let node_id = self.inner.hasher.id(&request.node);

        let mut guard = self.inner.state.write().expect("cache lock poisoned");
        let state = &mut *guard;

        let info = Arc::clone(
            state
                .status
                .entry(node_id.clone())
                .or_insert_with(|| Arc::new(StatusInfo::new(request.node.clone()))),
        );
        info.touch();

        // Single-slot channel: responding can never block, even before the
        // consumer starts reading.
        let (sender, receiver) = oneshot::channel();
        let watch = Watch::new(receiver);

        match state.snapshots.get(&node_id) {
            Some(snapshot) => {
                let version = snapshot.version(&request.type_tag);
                if version == request.version {
                    // client is current: leave an open watch
                    let cancel = self.register_watch(&info, node_id, request, sender);
                    (watch, Some(cancel))
                } else {
                    // the stored snapshot is already ahead: respond now
                    let resources = snapshot.resources(&request.type_tag);
                    self.inner.respond(request, sender, resources, version);
                    (watch, None)
                }
            }
            None => {
                let cancel = self.register_watch(&info, node_id, request, sender);
                (watch, Some(cancel))
            }
        }
    }

    fn fetch(&self, request: &Request) -> ConvoyResult<Response> {
        let node_id = self.inner.hasher.id(&request.node);
        let state = self.inner.state.read().expect("cache lock poisoned");

        match state.snapshots.get(&node_id) {
            Some(snapshot) => {
                let version = snapshot.version(&request.type_tag);
                if request.version == version {
                    trace!(node = %node_id, version = %version, "fetch skipped, client current");
                    self.inner.stats.record_fetch_skipped();
                    return Err(ConvoyError::SkipFetch);
                }

                let resources = snapshot.resources(&request.type_tag);
                self.inner.stats.record_fetch_served();
                Ok(create_response(request.clone(), resources, version))
            }
            None => Err(ConvoyError::MissingSnapshot { node_id }),
        }
    }
}

impl Cache for SnapshotCache {
    fn get_snapshot(&self, node_id: &str) -> ConvoyResult<Arc<dyn Snapshot>> {
        let state = self.inner.state.read().expect("cache lock poisoned");
        state
            .snapshots
            .get(node_id)
            .cloned()
            .ok_or_else(|| ConvoyError::SnapshotNotFound {
                node_id: node_id.to_string(),
            })
    }

    fn set_snapshot(&self, node_id: &str, snapshot: Arc<dyn Snapshot>) {
        // The write lock is held across delivery so a concurrent
        // clear_snapshot cannot erase the status entry mid-walk. Delivery
        // itself never blocks.
        let mut guard = self.inner.state.write().expect("cache lock poisoned");
        let state = &mut *guard;

        state
            .snapshots
            .insert(node_id.to_string(), Arc::clone(&snapshot));
        self.inner.stats.record_snapshot_set();
        debug!(node = %node_id, types = ?snapshot.supported_types(), "set snapshot");

        if let Some(info) = state.status.get(node_id) {
            for (watch_id, watch, version) in info.take_stale(snapshot.as_ref()) {
                debug!(
                    watch = %watch_id,
                    names = ?watch.request.resource_names,
                    version = %version,
                    "waking stale watch"
                );
                let resources = snapshot.resources(&watch.request.type_tag);
                self.inner.respond(watch.request, watch.sender, resources, version);
            }
        }
    }

    fn clear_snapshot(&self, node_id: &str) {
        let mut state = self.inner.state.write().expect("cache lock poisoned");

        let snapshot = state.snapshots.remove(node_id);
        let status = state.status.remove(node_id);
        if snapshot.is_some() || status.is_some() {
            self.inner.stats.record_snapshot_cleared();
            debug!(node = %node_id, "cleared snapshot and status");
        }
    }

    fn snapshot_count(&self) -> usize {
        self.inner
            .state
            .read()
            .expect("cache lock poisoned")
            .snapshots
            .len()
    }

    fn get_status_info(&self, node_id: &str) -> Option<StatusHandle> {
        let state = self.inner.state.read().expect("cache lock poisoned");
        state.status.get(node_id).cloned()
    }

    fn get_status_keys(&self) -> Vec<String> {
        let state = self.inner.state.read().expect("cache lock poisoned");
        state.status.keys().cloned().collect()
    }
}

impl CacheInner {
    /// Deliver a response on a watch channel, applying the aggregated-mode
    /// subset check first.
    ///
    /// When the check fails the send is silently skipped and the sender is
    /// dropped; the watch is never responded and the client is expected to
    /// issue a new request naming the missing resources.
    fn respond(
        &self,
        request: Request,
        sender: oneshot::Sender<Response>,
        resources: HashMap<String, BoxResource>,
        version: ResourceVersion,
    ) {
        if self.aggregated && !request.resource_names.is_empty() {
            if let Err(unnamed) = superset(&request.resource_names, &resources) {
                info!(
                    type_tag = %request.type_tag,
                    name = %unnamed,
                    "aggregated mode: not responding, resource not named in request"
                );
                self.stats.record_response_suppressed();
                return;
            }
        }

        info!(
            type_tag = %request.type_tag,
            names = ?request.resource_names,
            request_version = %request.version,
            version = %version,
            "responding to watch"
        );

        // The receiver may already be gone; delivery is best effort.
        if sender.send(create_response(request, resources, version)).is_ok() {
            self.stats.record_response_delivered();
        }
    }
}

/// Check that every resource is named in the request; returns the first
/// unnamed resource otherwise.
fn superset(names: &[String], resources: &HashMap<String, BoxResource>) -> Result<(), String> {
    let named: HashSet<&str> = names.iter().map(String::as_str).collect();
    for name in resources.keys() {
        if !named.contains(name.as_str()) {
            return Err(name.clone());
        }
    }
    Ok(())
}

/// Package a response: the requested selection of `resources` at the
/// snapshot's `version`.
///
/// An empty name list selects everything. The request's own version plays no
/// part; the response always carries the snapshot's.
fn create_response(
    request: Request,
    resources: HashMap<String, BoxResource>,
    version: ResourceVersion,
) -> Response {
    let filtered: Vec<BoxResource> = if request.resource_names.is_empty() {
        resources.into_values().collect()
    } else {
        let requested: HashSet<&str> = request.resource_names.iter().map(String::as_str).collect();
        resources
            .into_iter()
            .filter(|(name, _)| requested.contains(name.as_str()))
            .map(|(_, resource)| resource)
            .collect()
    };

    Response {
        request,
        version,
        resources: filtered,
    }
}

/// Handle removing one registered watch.
///
/// Idempotent and thread-safe: cancelling after delivery, after
/// `clear_snapshot`, or repeatedly is a no-op.
pub struct WatchCancel {
    inner: Arc<CacheInner>,
    node_id: String,
    watch_id: WatchId,
}

impl WatchCancel {
    /// Remove the watch. Nothing is delivered on its channel.
    pub fn cancel(&self) {
        let state = self.inner.state.read().expect("cache lock poisoned");
        if let Some(info) = state.status.get(&self.node_id) {
            info.remove_watch(&self.watch_id);
        }
    }
}

impl fmt::Debug for WatchCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCancel")
            .field("node_id", &self.node_id)
            .field("watch_id", &self.watch_id)
            .finish()
    }
}

/// Builder for [`SnapshotCache`].
#[derive(Debug, Default)]
pub struct CacheBuilder {
    aggregated: bool,
    hasher: Option<Box<dyn NodeHash>>,
}

impl CacheBuilder {
    /// Enable or disable aggregated delivery (off by default).
    #[must_use]
    pub fn aggregated(mut self, aggregated: bool) -> Self {
        self.aggregated = aggregated;
        self
    }

    /// Set the node hasher (defaults to [`IdHash`]).
    #[must_use]
    pub fn hasher(mut self, hasher: impl NodeHash + 'static) -> Self {
        self.hasher = Some(Box::new(hasher));
        self
    }

    /// Build the cache.
    #[must_use]
    pub fn build(self) -> SnapshotCache {
        SnapshotCache {
            inner: Arc::new(CacheInner {
                aggregated: self.aggregated,
                hasher: self.hasher.unwrap_or_else(|| Box::new(IdHash)),
                state: RwLock::default(),
                stats: CacheStats::new(),
            }),
        }
    }
}
