//! Aggregator configuration.
//!
//! The config file is optional — a missing file yields
//! `AggregatorConfig::default()`. Unknown keys are silently ignored by
//! serde (`deny_unknown_fields` off) so old files keep working as fields
//! are added.

use crate::fetch::SortOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Tuning knobs for the aggregation engine.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Items requested per page.
    pub page_size: u32,

    /// Result ordering requested from the backend.
    pub sort: SortOrder,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            sort: SortOrder::Recent,
            request_timeout_secs: 30,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AggregatorConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(AggregatorConfig::default())`
    /// - Empty file → `Ok(AggregatorConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping a corrupted or
        // maliciously large file into memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
            Ok(_) => {}
        }

        let text = std::fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&text)?)
    }
}
