//! The fetch collaborator seam.
//!
//! The orchestrator is transport-agnostic: it hands a [`Fetcher`] a query,
//! a page number, a page size and a sort order, and gets back a future that
//! resolves to a batch of [`RemoteItem`]s or a [`FetchError`]. Cancellation
//! happens above this seam — the orchestrator aborts the task driving the
//! future, so implementations only need to be drop-safe.
//!
//! [`HttpFetcher`] is the default implementation over a JSON-over-HTTP
//! search endpoint.

mod http;

pub use http::HttpFetcher;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result ordering requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Recent,
    Popular,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Recent
    }
}

impl SortOrder {
    /// The query-parameter spelling the backend expects.
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Popular => "popular",
        }
    }
}

/// An item as returned by a backend, before the orchestrator stamps it
/// with its origin source and page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: i64,
    pub title: String,
    pub url: String,
}

/// Errors a fetch can fail with.
///
/// Every variant is terminal for that request — the engine reports the
/// failure as a loading-state transition and moves on; the next explicit
/// load is the retry mechanism.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body was not a valid item page
    #[error("Decode error: {0}")]
    Decode(String),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// A pageable, cancellable remote source of items.
///
/// One call fetches exactly one page. The returned future must be safe to
/// drop at any await point: the orchestrator cancels requests by aborting
/// the task polling it.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
        sort: SortOrder,
    ) -> BoxFuture<'static, Result<Vec<RemoteItem>, FetchError>>;
}
