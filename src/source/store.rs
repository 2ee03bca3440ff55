//! Persistence seam for source configuration.
//!
//! The engine only touches the store at registry mutation boundaries
//! (add, remove, active-flag flip), never mid-merge. Ship your own
//! implementation to put sources wherever you like; [`TomlStore`] is the
//! file-backed default and [`NullStore`] opts out entirely.

use crate::source::Source;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in source file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize sources: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where configured sources live between runs.
///
/// Failures are surfaced to the caller of the mutating operation but never
/// poison the in-memory registry — the engine keeps running on what it has.
pub trait SourceStore: Send + 'static {
    /// Load every persisted source, in configuration order.
    fn load_sources(&self) -> Result<Vec<Source>, StoreError>;

    /// Persist a source (insert or update by key).
    fn save_source(&mut self, source: &Source) -> Result<(), StoreError>;

    /// Forget a source. Removing an unknown key is a no-op.
    fn remove_source(&mut self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// TomlStore
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct SourceFile {
    #[serde(default)]
    sources: Vec<Source>,
}

/// TOML-file-backed store.
///
/// The whole file is rewritten on every mutation via write-to-temp-then-
/// rename, so a crash mid-save never leaves a half-written source list.
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> Result<SourceFile, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No source file found, starting empty");
                Ok(SourceFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &SourceFile) -> Result<(), StoreError> {
        let text = toml::to_string_pretty(file)?;
        atomic_write(&self.path, text.as_bytes())?;
        Ok(())
    }
}

impl SourceStore for TomlStore {
    fn load_sources(&self) -> Result<Vec<Source>, StoreError> {
        Ok(self.read_file()?.sources)
    }

    fn save_source(&mut self, source: &Source) -> Result<(), StoreError> {
        let mut file = self.read_file()?;
        match file.sources.iter_mut().find(|s| s.key == source.key) {
            Some(existing) => *existing = source.clone(),
            None => file.sources.push(source.clone()),
        }
        self.write_file(&file)
    }

    fn remove_source(&mut self, key: &str) -> Result<(), StoreError> {
        let mut file = self.read_file()?;
        let before = file.sources.len();
        file.sources.retain(|s| &*s.key != key);
        if file.sources.len() == before {
            return Ok(());
        }
        self.write_file(&file)
    }
}

/// Write a file atomically: write to a randomized temp path in the same
/// directory, sync, then rename over the destination.
fn atomic_write(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;

    if let Err(e) = temp_file
        .write_all(content)
        .and_then(|_| temp_file.sync_all())
    {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(temp_file);

    std::fs::rename(&temp_path, dst)
}

// ============================================================================
// NullStore
// ============================================================================

/// Store that persists nothing. For callers that own persistence
/// themselves or don't want any.
#[derive(Debug, Default)]
pub struct NullStore;

impl SourceStore for NullStore {
    fn load_sources(&self) -> Result<Vec<Source>, StoreError> {
        Ok(Vec::new())
    }

    fn save_source(&mut self, _source: &Source) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove_source(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> TomlStore {
        let path = std::env::temp_dir().join(format!(
            "tributary-store-{}-{}.toml",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        TomlStore::new(path)
    }

    #[test]
    fn missing_file_loads_empty() {
        let store = temp_store("missing");
        assert!(store.load_sources().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = temp_store("roundtrip");
        store
            .save_source(&Source::new("a", "apples", true))
            .unwrap();
        store.save_source(&Source::new("b", "bears", false)).unwrap();

        let sources = store.load_sources().unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(&*sources[0].key, "a");
        assert!(!sources[1].active);

        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn save_updates_existing_key_in_place() {
        let mut store = temp_store("update");
        store
            .save_source(&Source::new("a", "apples", true))
            .unwrap();
        store
            .save_source(&Source::new("a", "apples", false))
            .unwrap();

        let sources = store.load_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert!(!sources[0].active);

        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn remove_unknown_key_is_noop() {
        let mut store = temp_store("remove-unknown");
        store
            .save_source(&Source::new("a", "apples", true))
            .unwrap();
        store.remove_source("missing").unwrap();
        assert_eq!(store.load_sources().unwrap().len(), 1);

        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn remove_deletes_only_named_key() {
        let mut store = temp_store("remove");
        store
            .save_source(&Source::new("a", "apples", true))
            .unwrap();
        store.save_source(&Source::new("b", "bears", true)).unwrap();
        store.remove_source("a").unwrap();

        let sources = store.load_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(&*sources[0].key, "b");

        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let store = temp_store("invalid");
        std::fs::write(&store.path, "not [valid toml").unwrap();
        assert!(matches!(store.load_sources(), Err(StoreError::Parse(_))));

        let _ = std::fs::remove_file(&store.path);
    }
}
