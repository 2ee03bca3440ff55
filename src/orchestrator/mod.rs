//! Load orchestration: the single-threaded coordinator that drives fetches.
//!
//! All engine state — the source registry, pagination cursors, the
//! in-flight request map, the load gauge and the feed itself — is owned by
//! one coordinator task. External commands and fetch completions
//! arrive through the same message channel, so there is exactly one
//! mutation path and no locks.
//!
//! - [`Aggregator`] - the public handle to the coordinator task
//! - [`PageTable`] - per-source page cursors
//! - `LoadGauge` - the edge-triggered aggregate loading counter

mod coordinator;
mod gauge;
mod pagination;

pub use coordinator::Aggregator;
pub use pagination::PageTable;

pub(crate) use gauge::LoadGauge;
