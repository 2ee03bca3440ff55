//! The deduplicating feed collection.
//!
//! Pages arrive in arbitrary order across sources; the list accepts each
//! item exactly once (the same item can be returned by multiple sources)
//! and keeps arrival order. Mutations return the change events to deliver,
//! so the caller controls the notification channel while this stays a
//! plain, synchronous data structure.

use crate::feed::FeedItem;
use std::ops::Range;

/// Incremental feed change notification.
///
/// Events describe the mutation that was applied, in application order.
/// Indices are positions at the time the event was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// An item was appended at `index`.
    Inserted { index: usize },
    /// A contiguous run of `len` items starting at `start` was removed.
    RemovedRange { start: usize, len: usize },
    /// The collection changed wholesale; re-read it.
    Reset,
}

/// Insertion-ordered, deduplicated collection of accepted feed items.
///
/// Never re-sorted: position is arrival order of accepted items. Dedup is
/// a linear scan of the accepted collection — feed sizes are bounded by
/// the visible window, so this beats maintaining a parallel index.
#[derive(Debug, Default)]
pub struct FeedList {
    items: Vec<FeedItem>,
}

impl FeedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Position of the first item with the given id, if any.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Merge a batch of incoming items, appending the ones not already
    /// accepted. The scan runs against the collection as it grows, so a
    /// duplicate pair inside one batch also collapses to a single copy.
    ///
    /// Returns one `Inserted` event per accepted item, in append order.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = FeedItem>) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        for item in incoming {
            if self.items.iter().any(|existing| existing.is_same_item(&item)) {
                continue;
            }
            self.items.push(item);
            events.push(FeedEvent::Inserted {
                index: self.items.len() - 1,
            });
        }
        events
    }

    /// Remove every item stamped with `source_key`, preserving the relative
    /// order of the rest. One aggregate `Reset` (not per-item events);
    /// `None` if the source had nothing in the feed.
    pub fn remove_by_source(&mut self, source_key: &str) -> Option<FeedEvent> {
        let before = self.items.len();
        self.items.retain(|item| &*item.source_key != source_key);
        if self.items.len() == before {
            return None;
        }
        tracing::debug!(
            source = source_key,
            removed = before - self.items.len(),
            "Removed source items from feed"
        );
        Some(FeedEvent::Reset)
    }

    /// Remove a contiguous range of items (window trimming). `None` if the
    /// clamped range is empty.
    pub fn remove_range(&mut self, range: Range<usize>) -> Option<FeedEvent> {
        let start = range.start.min(self.items.len());
        let end = range.end.min(self.items.len());
        if start >= end {
            return None;
        }
        self.items.drain(start..end);
        Some(FeedEvent::RemovedRange {
            start,
            len: end - start,
        })
    }

    /// Empty the collection. Always a full reset — hard refresh semantics.
    pub fn clear(&mut self) -> FeedEvent {
        self.items.clear();
        FeedEvent::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(id: i64, source: &str, page: u32) -> FeedItem {
        FeedItem {
            id,
            title: format!("Item {id}"),
            url: format!("https://example.com/{id}"),
            source_key: source.into(),
            page,
        }
    }

    #[test]
    fn merge_appends_in_arrival_order() {
        let mut feed = FeedList::new();
        let events = feed.merge(vec![item(1, "a", 1), item(2, "a", 1)]);
        assert_eq!(
            events,
            vec![
                FeedEvent::Inserted { index: 0 },
                FeedEvent::Inserted { index: 1 }
            ]
        );

        let events = feed.merge(vec![item(3, "b", 1)]);
        assert_eq!(events, vec![FeedEvent::Inserted { index: 2 }]);
        let ids: Vec<_> = feed.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn merge_drops_duplicates_across_batches() {
        let mut feed = FeedList::new();
        feed.merge(vec![item(1, "a", 1)]);
        let events = feed.merge(vec![item(1, "b", 3), item(2, "b", 3)]);

        // the duplicate carries different stamps but the same payload
        assert_eq!(events, vec![FeedEvent::Inserted { index: 1 }]);
        assert_eq!(feed.len(), 2);
        assert_eq!(&*feed.items()[0].source_key, "a");
    }

    #[test]
    fn merge_drops_duplicates_within_one_batch() {
        let mut feed = FeedList::new();
        let events = feed.merge(vec![item(1, "a", 1), item(1, "a", 1), item(2, "a", 1)]);
        assert_eq!(events.len(), 2);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn remove_by_source_keeps_relative_order() {
        let mut feed = FeedList::new();
        feed.merge(vec![
            item(1, "a", 1),
            item(2, "b", 1),
            item(3, "a", 1),
            item(4, "b", 1),
            item(5, "a", 2),
        ]);

        let event = feed.remove_by_source("a");
        assert_eq!(event, Some(FeedEvent::Reset));
        let ids: Vec<_> = feed.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn remove_by_source_without_items_is_silent() {
        let mut feed = FeedList::new();
        feed.merge(vec![item(1, "a", 1)]);
        assert_eq!(feed.remove_by_source("b"), None);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn remove_range_emits_range_event() {
        let mut feed = FeedList::new();
        feed.merge((1..=5).map(|id| item(id, "a", 1)).collect::<Vec<_>>());

        let event = feed.remove_range(1..3);
        assert_eq!(event, Some(FeedEvent::RemovedRange { start: 1, len: 2 }));
        let ids: Vec<_> = feed.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 4, 5]);

        // out-of-bounds ranges clamp; empty result is silent
        assert_eq!(feed.remove_range(10..20), None);
    }

    #[test]
    fn clear_resets() {
        let mut feed = FeedList::new();
        feed.merge(vec![item(1, "a", 1)]);
        assert_eq!(feed.clear(), FeedEvent::Reset);
        assert!(feed.is_empty());
    }

    #[test]
    fn position_of_finds_first_match() {
        let mut feed = FeedList::new();
        feed.merge(vec![item(10, "a", 1), item(20, "a", 1)]);
        assert_eq!(feed.position_of(20), Some(1));
        assert_eq!(feed.position_of(99), None);
    }

    proptest! {
        /// Merging any interleaving of two batches that share items yields a
        /// feed with no two natural-key-equal entries.
        #[test]
        fn merged_feed_never_holds_equal_items(
            ids_a in proptest::collection::vec(0i64..20, 0..30),
            ids_b in proptest::collection::vec(0i64..20, 0..30),
            a_first in any::<bool>(),
        ) {
            let batch = |ids: &[i64], source: &str| -> Vec<FeedItem> {
                ids.iter().map(|&id| item(id, source, 1)).collect()
            };

            let mut feed = FeedList::new();
            if a_first {
                feed.merge(batch(&ids_a, "a"));
                feed.merge(batch(&ids_b, "b"));
            } else {
                feed.merge(batch(&ids_b, "b"));
                feed.merge(batch(&ids_a, "a"));
            }

            for (i, left) in feed.items().iter().enumerate() {
                for right in &feed.items()[i + 1..] {
                    prop_assert!(!left.is_same_item(right));
                }
            }
        }
    }
}
