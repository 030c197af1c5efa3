//! Cache operation counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for cache operations.
///
/// All counters are atomic; reads and writes are racy-by-design snapshots
/// for observability, not for synchronization.
#[derive(Debug, Default)]
pub struct CacheStats {
    snapshots_set: AtomicU64,
    snapshots_cleared: AtomicU64,
    watches_opened: AtomicU64,
    responses_delivered: AtomicU64,
    responses_suppressed: AtomicU64,
    fetches_served: AtomicU64,
    fetches_skipped: AtomicU64,
}

impl CacheStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_snapshot_set(&self) {
        self.snapshots_set.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_snapshot_cleared(&self) {
        self.snapshots_cleared.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_watch_opened(&self) {
        self.watches_opened.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_response_delivered(&self) {
        self.responses_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_response_suppressed(&self) {
        self.responses_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fetch_served(&self) {
        self.fetches_served.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fetch_skipped(&self) {
        self.fetches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshots installed.
    #[inline]
    #[must_use]
    pub fn snapshots_set(&self) -> u64 {
        self.snapshots_set.load(Ordering::Relaxed)
    }

    /// Nodes cleared.
    #[inline]
    #[must_use]
    pub fn snapshots_cleared(&self) -> u64 {
        self.snapshots_cleared.load(Ordering::Relaxed)
    }

    /// Watches registered (synchronous responses are not counted).
    #[inline]
    #[must_use]
    pub fn watches_opened(&self) -> u64 {
        self.watches_opened.load(Ordering::Relaxed)
    }

    /// Responses delivered on a watch channel.
    #[inline]
    #[must_use]
    pub fn responses_delivered(&self) -> u64 {
        self.responses_delivered.load(Ordering::Relaxed)
    }

    /// Responses withheld by the aggregated-mode subset check.
    #[inline]
    #[must_use]
    pub fn responses_suppressed(&self) -> u64 {
        self.responses_suppressed.load(Ordering::Relaxed)
    }

    /// Fetches answered with resources.
    #[inline]
    #[must_use]
    pub fn fetches_served(&self) -> u64 {
        self.fetches_served.load(Ordering::Relaxed)
    }

    /// Fetches skipped because the client was current.
    #[inline]
    #[must_use]
    pub fn fetches_skipped(&self) -> u64 {
        self.fetches_skipped.load(Ordering::Relaxed)
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.snapshots_set.store(0, Ordering::Relaxed);
        self.snapshots_cleared.store(0, Ordering::Relaxed);
        self.watches_opened.store(0, Ordering::Relaxed);
        self.responses_delivered.store(0, Ordering::Relaxed);
        self.responses_suppressed.store(0, Ordering::Relaxed);
        self.fetches_served.store(0, Ordering::Relaxed);
        self.fetches_skipped.store(0, Ordering::Relaxed);
    }
}
