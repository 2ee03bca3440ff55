//! In-memory source registry.
//!
//! Plain storage with transition detection: mutation methods report what
//! actually changed so the coordinator can react inline (cancel in-flight
//! work, reset cursors) before it processes anything else. Operations on
//! unknown keys are silent no-ops, not errors.

use crate::source::{Source, SourceKey};

/// Ordered collection of configured sources, keyed by their stable key.
///
/// Order is configuration order (the order sources were loaded or added),
/// which is the order `load_all` dispatches in.
#[derive(Debug, Default)]
pub struct Registry {
    sources: Vec<Source>,
}

impl Registry {
    pub fn new(sources: Vec<Source>) -> Self {
        let mut registry = Self::default();
        for source in sources {
            // first occurrence wins; duplicates in persisted config are dropped
            registry.add(source);
        }
        registry
    }

    /// All sources in configuration order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, key: &str) -> Option<&Source> {
        self.sources.iter().find(|s| &*s.key == key)
    }

    /// Add a source. Returns false (and leaves the registry untouched) if
    /// the key is already present — key uniqueness is mandatory.
    pub fn add(&mut self, source: Source) -> bool {
        if self.get(&source.key).is_some() {
            tracing::debug!(key = %source.key, "Ignoring source with duplicate key");
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Remove a source by key, returning it if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Source> {
        let pos = self.sources.iter().position(|s| &*s.key == key)?;
        Some(self.sources.remove(pos))
    }

    /// Flip a source's active flag.
    ///
    /// Returns the changed source only on a real transition; unknown keys
    /// and no-op flips return `None` so callers never run cancellation or
    /// reload logic for a flag that did not move.
    pub fn set_active(&mut self, key: &str, active: bool) -> Option<Source> {
        let source = self.sources.iter_mut().find(|s| &*s.key == key)?;
        if source.active == active {
            return None;
        }
        source.active = active;
        Some(source.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_ab() -> Registry {
        Registry::new(vec![
            Source::new("a", "apples", true),
            Source::new("b", "bears", false),
        ])
    }

    #[test]
    fn add_rejects_duplicate_key() {
        let mut registry = registry_ab();
        assert!(!registry.add(Source::new("a", "other query", false)));
        assert_eq!(registry.sources().len(), 2);
        assert_eq!(registry.get("a").unwrap().query, "apples");
    }

    #[test]
    fn new_drops_duplicate_keys_keeping_first() {
        let registry = Registry::new(vec![
            Source::new("a", "first", true),
            Source::new("a", "second", false),
        ]);
        assert_eq!(registry.sources().len(), 1);
        assert_eq!(registry.get("a").unwrap().query, "first");
    }

    #[test]
    fn set_active_unknown_key_is_noop() {
        let mut registry = registry_ab();
        assert!(registry.set_active("missing", true).is_none());
    }

    #[test]
    fn set_active_same_value_is_not_a_transition() {
        let mut registry = registry_ab();
        assert!(registry.set_active("a", true).is_none());
        assert!(registry.set_active("b", false).is_none());
    }

    #[test]
    fn set_active_reports_real_transition() {
        let mut registry = registry_ab();
        let changed = registry.set_active("b", true).unwrap();
        assert_eq!(&*changed.key, "b");
        assert!(changed.active);
        assert!(registry.get("b").unwrap().active);
    }

    #[test]
    fn remove_returns_source_and_preserves_order() {
        let mut registry = registry_ab();
        registry.add(Source::new("c", "cats", true));
        let removed = registry.remove("b").unwrap();
        assert_eq!(&*removed.key, "b");
        let keys: Vec<_> = registry.sources().iter().map(|s| s.key.clone()).collect();
        assert_eq!(keys.iter().map(|k| &**k).collect::<Vec<_>>(), ["a", "c"]);
        assert!(registry.remove("b").is_none());
    }
}
