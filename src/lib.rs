//! Multi-source feed aggregation engine.
//!
//! `tributary` merges paginated results from multiple independent remote
//! sources into a single deduplicated, insertion-ordered feed, while
//! tracking aggregate loading state and cancelling in-flight work when a
//! source is deactivated mid-fetch.
//!
//! # Architecture
//!
//! - [`source`] - the source registry and its persistence seam
//! - [`fetch`] - the cancellable fetch collaborator (HTTP default)
//! - [`orchestrator`] - the single-threaded coordinator that owns all
//!   mutable state: pagination cursors, the in-flight request map, the
//!   edge-triggered load gauge, and the feed itself
//! - [`feed`] - the deduplicating merge engine and its change events
//! - [`listener`] - the outward callback contract for render layers
//!
//! Fetch completions and external commands flow through one message
//! channel into the coordinator task, so every state mutation is
//! serialized without locks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tributary::{Aggregator, AggregatorConfig, HttpFetcher, Source};
//!
//! # async fn demo() {
//! let config = AggregatorConfig::default();
//! let fetcher = HttpFetcher::new(
//!     "https://api.example.com/search".parse().unwrap(),
//!     reqwest::Client::new(),
//! );
//! let sources = vec![Source::new("material-design", "material design", true)];
//!
//! let engine = Aggregator::with_sources(config, sources, Arc::new(fetcher));
//! engine.load_all();
//! let items = engine.snapshot().await;
//! # let _ = items;
//! # }
//! ```

pub mod config;
pub mod feed;
pub mod fetch;
pub mod listener;
pub mod orchestrator;
pub mod source;

pub use config::{AggregatorConfig, ConfigError};
pub use feed::{FeedEvent, FeedItem, FeedList};
pub use fetch::{FetchError, Fetcher, HttpFetcher, RemoteItem, SortOrder};
pub use listener::FeedListener;
pub use orchestrator::{Aggregator, PageTable};
pub use source::{NullStore, Registry, Source, SourceKey, SourceStore, StoreError, TomlStore};
