//! Source management: the set of remote data sources the feed is built from.
//!
//! A [`Source`] is a named query against a remote backend. Sources are
//! identified by a stable key, can be toggled active/inactive at runtime,
//! and survive restarts through a [`SourceStore`].
//!
//! - [`Registry`] - in-memory registry with transition detection
//! - [`SourceStore`] - persistence seam ([`TomlStore`] default, [`NullStore`] fallback)

mod registry;
mod store;

pub use registry::Registry;
pub use store::{NullStore, SourceStore, StoreError, TomlStore};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stable identifier for a source. `Arc<str>` because the key is cloned
/// into in-flight request entries, feed item stamps, and spawned fetch
/// tasks; cloning must not copy the string.
pub type SourceKey = Arc<str>;

/// A configured data source: a query against a remote backend plus an
/// active flag.
///
/// The key is the join identity used throughout the engine and never
/// changes after creation. Only `active` is mutable, and only through
/// the aggregator so the matching cancellation/cursor bookkeeping runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub key: SourceKey,
    pub query: String,
    pub active: bool,
}

impl Source {
    pub fn new(key: impl Into<SourceKey>, query: impl Into<String>, active: bool) -> Self {
        Self {
            key: key.into(),
            query: query.into(),
            active,
        }
    }
}
