//! Running counters kept by the correlator.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free event counters, updated from every negotiating thread
#[derive(Debug, Default)]
pub struct CorrelatorStats {
    begins: AtomicU64,
    ends: AtomicU64,
    ignored: AtomicU64,
    mismatches: AtomicU64,
    completed_trees: AtomicU64,
    max_depth: AtomicU64,
}

impl CorrelatorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_begin(&self, depth: usize) {
        self.begins.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_end(&self) {
        self.ends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_mismatch(&self) {
        self.mismatches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed_trees.fetch_add(1, Ordering::Relaxed);
    }

    /// Plain copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            begins: self.begins.load(Ordering::Relaxed),
            ends: self.ends.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
            completed_trees: self.completed_trees.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of `CorrelatorStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Accepted begin events
    pub begins: u64,

    /// End events that closed a query
    pub ends: u64,

    /// Events for query types that are not traced
    pub ignored: u64,

    /// End events discarded as protocol mismatches
    pub mismatches: u64,

    /// Trees rendered
    pub completed_trees: u64,

    /// Deepest nesting seen on any thread
    pub max_depth: u64,
}

impl StatsSnapshot {
    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "{} trees, {} begins, {} ends, {} mismatches, {} ignored, max depth {}",
            self.completed_trees, self.begins, self.ends, self.mismatches, self.ignored, self.max_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_depth_keeps_maximum() {
        let stats = CorrelatorStats::new();
        stats.record_begin(1);
        stats.record_begin(3);
        stats.record_begin(2);

        let snap = stats.snapshot();
        assert_eq!(snap.begins, 3);
        assert_eq!(snap.max_depth, 3);
    }

    #[test]
    fn test_summary_format() {
        let snap = StatsSnapshot {
            begins: 4,
            ends: 4,
            ignored: 1,
            mismatches: 0,
            completed_trees: 2,
            max_depth: 2,
        };
        assert_eq!(
            snap.summary(),
            "2 trees, 4 begins, 4 ends, 0 mismatches, 1 ignored, max depth 2"
        );
    }
}
