//! Per-source pagination cursors.
//!
//! Cursor value 0 is the disabled/reset sentinel: a brand-new source and
//! an explicitly deactivated one both request page 1 next. That conflation
//! is deliberate and load-bearing — `is_enabled` doubles as the guard that
//! drops page results racing a deactivation.

use crate::source::SourceKey;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PageTable {
    cursors: HashMap<SourceKey, u32>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next page to request: 1 for unseen or reset
    /// keys, otherwise the stored cursor plus one. The returned value is
    /// stored as the new cursor.
    pub fn next_page(&mut self, key: &SourceKey) -> u32 {
        let next = self.cursors.get(key).copied().unwrap_or(0) + 1;
        self.cursors.insert(key.clone(), next);
        next
    }

    /// Reset a source's cursor to the disabled sentinel.
    pub fn reset(&mut self, key: &SourceKey) {
        self.cursors.insert(key.clone(), 0);
    }

    /// Drop a source's cursor entirely (the source left the registry).
    pub fn forget(&mut self, key: &str) {
        self.cursors.remove(key);
    }

    /// Reset every cursor (hard refresh).
    pub fn reset_all(&mut self) {
        for cursor in self.cursors.values_mut() {
            *cursor = 0;
        }
    }

    /// Whether the source has a live cursor. False for unknown, reset, or
    /// deactivated keys — a page result for a disabled source is stale and
    /// must be discarded.
    pub fn is_enabled(&self, key: &str) -> bool {
        matches!(self.cursors.get(key), Some(cursor) if *cursor != 0)
    }
}
