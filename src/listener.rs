//! The outward-facing callback contract.
//!
//! The render layer (or anything else observing the feed) implements
//! [`FeedListener`] and registers it with the aggregator. Callbacks are
//! delivered in the order the corresponding internal events were applied,
//! from the coordinator's own task. Do not re-enter the aggregator
//! synchronously from inside a callback.

use crate::feed::FeedEvent;
use std::sync::Arc;

/// Callbacks the engine exposes outward.
///
/// Two channels: edge-triggered aggregate loading state (`loading_started`
/// fires only on the 0→1 in-flight transition, `loading_finished` only on
/// 1→0), and incremental feed mutations. All methods default to no-ops so
/// implementors pick what they care about.
pub trait FeedListener: Send + Sync {
    fn loading_started(&self) {}

    fn loading_finished(&self) {}

    fn feed_event(&self, _event: &FeedEvent) {}
}

/// Registered listeners, identity-compared by `Arc` pointer.
///
/// Registration and removal are idempotent: registering the same `Arc`
/// twice keeps one entry, unregistering an unknown listener is a no-op.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<Arc<dyn FeedListener>>,
}

impl ListenerSet {
    pub fn register(&mut self, listener: Arc<dyn FeedListener>) {
        if self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return;
        }
        self.listeners.push(listener);
    }

    pub fn unregister(&mut self, listener: &Arc<dyn FeedListener>) {
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
    }

    pub fn notify_started(&self) {
        for listener in &self.listeners {
            listener.loading_started();
        }
    }

    pub fn notify_finished(&self) {
        for listener in &self.listeners {
            listener.loading_finished();
        }
    }

    pub fn notify_feed(&self, event: &FeedEvent) {
        for listener in &self.listeners {
            listener.feed_event(event);
        }
    }
}
