//! # convoy
//!
//! Versioned snapshot cache for distributing configuration to data-plane
//! proxies.
//!
//! Producers assemble internally consistent snapshots of configuration
//! resources and install them per node; proxies subscribe through
//! long-lived watches (or one-shot fetches) and receive an update whenever
//! the stored version for a watched type moves past the version they last
//! acknowledged.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use convoy::prelude::*;
//!
//! // Create a cache (non-aggregated, keyed by node id).
//! let cache = SnapshotCache::builder().build();
//!
//! // A proxy subscribes before any configuration exists.
//! let request = Request::new(Node::new("edge-proxy-1"), TypeTag::CLUSTER);
//! let (watch, _cancel) = cache.create_watch(request);
//!
//! // A producer installs a snapshot; the watch is woken.
//! let snapshot = SimpleSnapshot::builder()
//!     .version("v1")
//!     .resources(TypeTag::CLUSTER, vec![])
//!     .build();
//! cache.set_snapshot("edge-proxy-1", Arc::new(snapshot));
//!
//! let response = watch.blocking_recv().expect("watch was woken");
//! assert_eq!(response.version.as_str(), "v1");
//! ```
//!
//! ## Architecture
//!
//! This library is organized into two crates re-exported here:
//!
//! - `convoy-core` - Shared vocabulary: errors, node identity, resources,
//!   type tags, versions, request/response contracts
//! - `convoy-cache` - The snapshot cache, watch delivery, and status
//!   introspection
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - All fallible operations return `Result`
//! 2. **Snapshots are values** - Shared immutably, replaced atomically
//! 3. **Bounded work per call** - No background tasks, no suspension points;
//!    delivery is a non-blocking single-slot send
//! 4. **Observable** - `tracing` events and operation counters built in

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use convoy_cache as cache;
pub use convoy_core as core;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use convoy::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use convoy_core::{
        AnyResource, BoxResource, ConvoyError, ConvoyResult, FnvNodeHash, IdHash, Locality, Node,
        NodeHash, Request, Resource, ResourceVersion, Response, TypeTag,
    };

    // Cache types
    pub use convoy_cache::{
        Cache, CacheStats, ConfigWatcher, SimpleSnapshot, Snapshot, SnapshotCache, StatusHandle,
        Watch, WatchCancel,
    };
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("convoy {} (MSRV {})", VERSION, MSRV)
    }
}
