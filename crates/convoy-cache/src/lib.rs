//! # convoy-cache
//!
//! Versioned snapshot cache for configuration distribution to data-plane
//! proxies.
//!
//! The cache is the convergence point between producers that assemble
//! internally consistent configuration snapshots and the discovery server
//! that owns proxy sessions:
//!
//! - [`SnapshotCache`] - Per-node snapshot storage with watch delivery
//! - [`Snapshot`] - Capability trait for versioned, type-grouped resources
//! - [`SimpleSnapshot`] - Ready-made snapshot with dependency checking
//! - [`Watch`] - Single-delivery subscription handle
//!
//! ## Key Design Decisions
//!
//! - Snapshots are shared immutably (`Arc<dyn Snapshot>`) and atomically
//!   replaced; a delivered response keeps its resources alive past the next
//!   replacement
//! - Delivery uses a single-slot `oneshot` channel, so responding never
//!   blocks the writer
//! - Two-level locking: the cache lock guards the node maps, each node's
//!   status has its own lock; lock order is strictly cache then status
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use convoy_cache::{Cache, ConfigWatcher, SimpleSnapshot, SnapshotCache};
//! use convoy_core::{Node, Request, TypeTag};
//!
//! let cache = SnapshotCache::builder().build();
//!
//! let snapshot = SimpleSnapshot::builder()
//!     .version("v1")
//!     .resources(TypeTag::CLUSTER, vec![])
//!     .build();
//! cache.set_snapshot("edge-proxy-1", Arc::new(snapshot));
//!
//! let request = Request::new(Node::new("edge-proxy-1"), TypeTag::CLUSTER);
//! let response = cache.fetch(&request).unwrap();
//! assert_eq!(response.version.as_str(), "v1");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod snapshot;
mod stats;
mod status;
mod watch;

pub use cache::{Cache, CacheBuilder, ConfigWatcher, SnapshotCache, WatchCancel};
pub use snapshot::{SimpleSnapshot, SimpleSnapshotBuilder, Snapshot, TypedResources};
pub use stats::CacheStats;
pub use status::{StatusHandle, StatusInfo};
pub use watch::{Watch, WatchId};
