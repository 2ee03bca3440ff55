//! Edge-triggered count of concurrently in-flight requests.
//!
//! Listeners only hear about the 0→1 and 1→0 transitions; intermediate
//! increments and decrements between concurrent sources stay silent so a
//! spinner shown for "anything loading" never flickers.

#[derive(Debug, Default)]
pub(crate) struct LoadGauge {
    active: usize,
}

impl LoadGauge {
    /// Record a request start. True exactly on the 0→1 transition.
    pub fn raise(&mut self) -> bool {
        self.active += 1;
        self.active == 1
    }

    /// Record a request settling (success, failure, or cancellation).
    /// True exactly on the 1→0 transition. Never goes negative; lowering
    /// at zero is a bookkeeping bug upstream and is logged, not applied.
    pub fn lower(&mut self) -> bool {
        if self.active == 0 {
            tracing::warn!("Load gauge lowered at zero; dropping decrement");
            return false;
        }
        self.active -= 1;
        self.active == 0
    }

    /// Force the gauge back to zero (cancel-all). True if it was raised,
    /// i.e. a finished notification is owed.
    pub fn clear(&mut self) -> bool {
        let was_loading = self.active > 0;
        self.active = 0;
        was_loading
    }

    pub fn is_loading(&self) -> bool {
        self.active > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_fire_only_on_zero_transitions() {
        let mut gauge = LoadGauge::default();
        assert!(gauge.raise()); // 0 -> 1
        assert!(!gauge.raise()); // 1 -> 2
        assert!(!gauge.raise()); // 2 -> 3
        assert!(!gauge.lower()); // 3 -> 2
        assert!(!gauge.lower()); // 2 -> 1
        assert!(gauge.lower()); // 1 -> 0
        assert!(!gauge.is_loading());
    }

    #[test]
    fn lower_at_zero_is_dropped() {
        let mut gauge = LoadGauge::default();
        assert!(!gauge.lower());
        assert!(!gauge.is_loading());
        // the dropped decrement must not offset a later raise
        assert!(gauge.raise());
    }

    #[test]
    fn clear_reports_whether_finished_is_owed() {
        let mut gauge = LoadGauge::default();
        assert!(!gauge.clear()); // idle clear owes nothing
        gauge.raise();
        gauge.raise();
        assert!(gauge.clear());
        assert!(!gauge.is_loading());
    }
}
