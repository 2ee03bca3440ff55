//! The aggregated feed: item type and merge engine.
//!
//! - [`FeedItem`] - a remote item stamped with its origin source and page
//! - [`FeedList`] - the deduplicating, insertion-ordered collection
//! - [`FeedEvent`] - incremental change notifications for the render layer

mod items;
mod merge;

pub use items::FeedItem;
pub use merge::{FeedEvent, FeedList};
