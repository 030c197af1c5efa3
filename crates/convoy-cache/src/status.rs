//! Per-node status: open watches and last activity.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::SystemTime;

use convoy_core::{Node, ResourceVersion};

use crate::snapshot::Snapshot;
use crate::watch::{ResponseWatch, WatchId};

/// Status of one node: its descriptor, open watches, and last activity.
///
/// The mutable fields sit behind the status's own lock, taken after the
/// cache lock and never the other way around. Accessors on a handle
/// obtained from the cache take only the status lock.
#[derive(Debug)]
pub struct StatusInfo {
    /// Node descriptor from the first watch request, kept for introspection.
    node: Node,
    state: RwLock<StatusState>,
}

/// Shared handle to a node's status.
pub type StatusHandle = std::sync::Arc<StatusInfo>;

#[derive(Debug)]
struct StatusState {
    watches: HashMap<WatchId, ResponseWatch>,
    last_watch_request_time: SystemTime,
}

impl StatusInfo {
    pub(crate) fn new(node: Node) -> Self {
        Self {
            node,
            state: RwLock::new(StatusState {
                watches: HashMap::new(),
                last_watch_request_time: SystemTime::now(),
            }),
        }
    }

    /// The node descriptor supplied on this node's first watch request.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Number of currently open watches.
    #[must_use]
    pub fn num_watches(&self) -> usize {
        self.state.read().expect("status lock poisoned").watches.len()
    }

    /// Wall-clock time of the most recent watch request.
    #[must_use]
    pub fn last_watch_request_time(&self) -> SystemTime {
        self.state
            .read()
            .expect("status lock poisoned")
            .last_watch_request_time
    }

    /// Stamp the last-activity time.
    pub(crate) fn touch(&self) {
        self.state
            .write()
            .expect("status lock poisoned")
            .last_watch_request_time = SystemTime::now();
    }

    pub(crate) fn insert_watch(&self, id: WatchId, watch: ResponseWatch) {
        self.state
            .write()
            .expect("status lock poisoned")
            .watches
            .insert(id, watch);
    }

    pub(crate) fn remove_watch(&self, id: &WatchId) -> Option<ResponseWatch> {
        self.state
            .write()
            .expect("status lock poisoned")
            .watches
            .remove(id)
    }

    /// Remove and return every watch whose recorded version differs from the
    /// snapshot's version for its type, paired with that new version.
    ///
    /// One burst under the status write lock; watches whose version still
    /// matches are left open.
    pub(crate) fn take_stale(
        &self,
        snapshot: &dyn Snapshot,
    ) -> Vec<(WatchId, ResponseWatch, ResourceVersion)> {
        let mut state = self.state.write().expect("status lock poisoned");

        let stale: Vec<WatchId> = state
            .watches
            .iter()
            .filter(|(_, watch)| {
                snapshot.version(&watch.request.type_tag) != watch.request.version
            })
            .map(|(id, _)| *id)
            .collect();

        stale
            .into_iter()
            .filter_map(|id| {
                state.watches.remove(&id).map(|watch| {
                    let version = snapshot.version(&watch.request.type_tag);
                    (id, watch, version)
                })
            })
            .collect()
    }
}
