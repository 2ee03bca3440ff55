//! JSON-over-HTTP [`Fetcher`] implementation.
//!
//! Issues `GET {endpoint}?q=…&page=…&per_page=…&sort=…` and decodes the
//! body as a JSON array of [`RemoteItem`]. Deliberately has no retry or
//! backoff — a failed page is reported and forgotten, and the next
//! explicit load is the retry.

use crate::config::AggregatorConfig;
use crate::fetch::{FetchError, Fetcher, RemoteItem, SortOrder};
use futures::future::BoxFuture;
use futures::StreamExt;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Fetcher backed by a paginated JSON search endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
    max_response_bytes: usize,
}

impl HttpFetcher {
    pub fn new(endpoint: Url, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint,
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Build a fetcher with timeout and body-size limits from config.
    pub fn from_config(endpoint: Url, client: reqwest::Client, config: &AggregatorConfig) -> Self {
        Self {
            client,
            endpoint,
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn page_url(&self, query: &str, page: u32, page_size: u32, sort: SortOrder) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &page_size.to_string())
            .append_pair("sort", sort.as_param());
        url
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
        sort: SortOrder,
    ) -> BoxFuture<'static, Result<Vec<RemoteItem>, FetchError>> {
        let url = self.page_url(query, page, page_size, sort);
        let client = self.client.clone();
        let timeout = self.timeout;
        let limit = self.max_response_bytes;

        Box::pin(async move {
            let response = tokio::time::timeout(timeout, client.get(url.clone()).send())
                .await
                .map_err(|_| FetchError::Timeout)?
                .map_err(FetchError::Network)?;

            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            let bytes = read_limited_bytes(response, limit).await?;

            let items: Vec<RemoteItem> =
                serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

            tracing::debug!(url = %url, page = page, items = items.len(), "Fetched page");
            Ok(items)
        })
    }
}

/// Stream the response body, bailing out as soon as it exceeds `limit`.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
