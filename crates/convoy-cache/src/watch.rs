//! Watch subscriptions and their delivery channel.
//!
//! A watch is a long-lived subscription that delivers at most one response
//! and then terminates; the discovery server re-creates it for the next
//! round. Delivery rides on a single-slot [`oneshot`] channel, so the cache
//! side never blocks regardless of whether the consumer has started
//! reading.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

use convoy_core::{Request, Response};

/// Unique identifier for a watch.
///
/// Allocated from a process-wide monotonic counter and never reused. Used
/// only to key the per-node watch table; consumers hold a [`Watch`] and a
/// cancel handle instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Allocate the next watch ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of this watch ID.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Receiving end of a watch subscription.
///
/// The channel is written at most once. Three terminal outcomes exist:
/// a response arrives; the watch is cancelled or its node cleared, observed
/// as channel closure; or an aggregated-mode response was suppressed, also
/// observed as closure (the client is expected to issue a new request).
#[derive(Debug)]
pub struct Watch {
    receiver: oneshot::Receiver<Response>,
}

impl Watch {
    pub(crate) fn new(receiver: oneshot::Receiver<Response>) -> Self {
        Self { receiver }
    }

    /// Wait for the response.
    ///
    /// Returns `None` if the channel closed without a delivery.
    pub async fn recv(self) -> Option<Response> {
        self.receiver.await.ok()
    }

    /// Check for a response without waiting.
    pub fn try_recv(&mut self) -> Result<Response, oneshot::error::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block the current thread until the response arrives.
    ///
    /// Must not be called from an async context.
    pub fn blocking_recv(self) -> Option<Response> {
        self.receiver.blocking_recv().ok()
    }
}

/// A registered watch: the request that opened it plus the sending half of
/// its delivery channel.
#[derive(Debug)]
pub(crate) struct ResponseWatch {
    pub(crate) request: Request,
    pub(crate) sender: oneshot::Sender<Response>,
}
