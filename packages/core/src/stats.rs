//! Query execution statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

/// Counters updated while a query executes
#[derive(Debug)]
pub struct QueryStats {
    resources_scanned: AtomicU64,
    resources_matched: AtomicU64,
    evaluation_errors: AtomicU64,
    sub_queries: AtomicU64,
    started: Instant,
}

/// Point-in-time copy of [`QueryStats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryStatsSnapshot {
    pub resources_scanned: u64,
    pub resources_matched: u64,
    pub evaluation_errors: u64,
    pub sub_queries: u64,
    pub match_rate: f64,
    pub elapsed_micros: u64,
}

impl Default for QueryStats {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources_scanned: AtomicU64::new(0),
            resources_matched: AtomicU64::new(0),
            evaluation_errors: AtomicU64::new(0),
            sub_queries: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_scanned(&self) {
        self.resources_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_matched(&self) {
        self.resources_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluation_error(&self) {
        self.evaluation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sub_query(&self) {
        self.sub_queries.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> QueryStatsSnapshot {
        let scanned = self.resources_scanned.load(Ordering::Relaxed);
        let matched = self.resources_matched.load(Ordering::Relaxed);

        QueryStatsSnapshot {
            resources_scanned: scanned,
            resources_matched: matched,
            evaluation_errors: self.evaluation_errors.load(Ordering::Relaxed),
            sub_queries: self.sub_queries.load(Ordering::Relaxed),
            match_rate: if scanned > 0 {
                // Precision loss acceptable for statistics
                #[allow(clippy::cast_precision_loss)]
                {
                    matched as f64 / scanned as f64
                }
            } else {
                0.0
            },
            elapsed_micros: u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_from_many_threads() {
        let stats = QueryStats::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        stats.record_scanned();
                    }
                    stats.record_matched();
                });
            }
        });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.resources_scanned, 400);
        assert_eq!(snapshot.resources_matched, 4);
        assert!((snapshot.match_rate - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_match_rate() {
        assert!(QueryStats::new().snapshot().match_rate.abs() < f64::EPSILON);
    }
}
