//! Basic Metrics
//!
//! Request counters, exploration outcomes and latency tracking.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::explorer::Exploration;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total requests served
    total_requests: AtomicU64,

    /// Requests per route
    requests_by_route: RwLock<BTreeMap<String, u64>>,

    /// Exploration outcomes
    explorations: AtomicU64,
    vocabulary_misses: AtomicU64,
    pca_failures: AtomicU64,
    tsne_failures: AtomicU64,

    /// Latency tracking (simplified)
    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            requests_by_route: RwLock::new(BTreeMap::new()),
            explorations: AtomicU64::new(0),
            vocabulary_misses: AtomicU64::new(0),
            pca_failures: AtomicU64::new(0),
            tsne_failures: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record a served request
    pub fn record_request(&self, route: &str, latency: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        *self
            .requests_by_route
            .write()
            .entry(route.to_string())
            .or_insert(0) += 1;

        let latency_us = latency.as_micros() as u64;
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    /// Record the outcome of an exploration
    pub fn record_exploration(&self, exploration: &Exploration) {
        self.explorations.fetch_add(1, Ordering::Relaxed);
        match exploration {
            Exploration::NotFound { .. } => {
                self.vocabulary_misses.fetch_add(1, Ordering::Relaxed);
            }
            Exploration::Found { pca, tsne, .. } => {
                if pca.is_err() {
                    self.pca_failures.fetch_add(1, Ordering::Relaxed);
                }
                if tsne.is_err() {
                    self.tsne_failures.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get requests by route
    pub fn requests_by_route(&self) -> BTreeMap<String, u64> {
        self.requests_by_route.read().clone()
    }

    pub fn explorations(&self) -> u64 {
        self.explorations.load(Ordering::Relaxed)
    }

    pub fn vocabulary_misses(&self) -> u64 {
        self.vocabulary_misses.load(Ordering::Relaxed)
    }

    pub fn pca_failures(&self) -> u64 {
        self.pca_failures.load(Ordering::Relaxed)
    }

    pub fn tsne_failures(&self) -> u64 {
        self.tsne_failures.load(Ordering::Relaxed)
    }

    /// Get average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    /// Get min latency in microseconds
    pub fn min_latency_us(&self) -> u64 {
        let min = self.latency_min_us.load(Ordering::Relaxed);
        if min == u64::MAX {
            0
        } else {
            min
        }
    }

    /// Get max latency in microseconds
    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// Plain-text exposition, one `name value` pair per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "wordlens_requests_total {}", self.total_requests());
        for (route, count) in self.requests_by_route() {
            let _ = writeln!(out, "wordlens_requests{{route=\"{}\"}} {}", route, count);
        }
        let _ = writeln!(out, "wordlens_explorations_total {}", self.explorations());
        let _ = writeln!(out, "wordlens_vocabulary_misses_total {}", self.vocabulary_misses());
        let _ = writeln!(out, "wordlens_pca_failures_total {}", self.pca_failures());
        let _ = writeln!(out, "wordlens_tsne_failures_total {}", self.tsne_failures());
        let _ = writeln!(out, "wordlens_latency_avg_us {:.1}", self.avg_latency_us());
        let _ = writeln!(out, "wordlens_latency_min_us {}", self.min_latency_us());
        let _ = writeln!(out, "wordlens_latency_max_us {}", self.max_latency_us());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionError;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_request("/", Duration::from_micros(100));
        metrics.record_request("/", Duration::from_micros(200));
        metrics.record_request("/health", Duration::from_micros(150));

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.min_latency_us(), 100);
        assert_eq!(metrics.max_latency_us(), 200);
        assert!((metrics.avg_latency_us() - 150.0).abs() < 0.1);

        let by_route = metrics.requests_by_route();
        assert_eq!(by_route.get("/"), Some(&2));
        assert_eq!(by_route.get("/health"), Some(&1));
    }

    #[test]
    fn test_exploration_outcomes() {
        let metrics = Metrics::new();
        metrics.record_exploration(&Exploration::NotFound {
            word: "xyzzy".to_string(),
        });
        let failed = Err(ProjectionError::InvalidParameter("x".to_string()));
        metrics.record_exploration(&Exploration::Found {
            word: "king".to_string(),
            top_n: 1,
            neighbors: Vec::new(),
            pca: failed.clone(),
            tsne: failed,
        });

        assert_eq!(metrics.explorations(), 2);
        assert_eq!(metrics.vocabulary_misses(), 1);
        assert_eq!(metrics.pca_failures(), 1);
        assert_eq!(metrics.tsne_failures(), 1);

        let text = metrics.render();
        assert!(text.contains("wordlens_vocabulary_misses_total 1"));
    }

    #[test]
    fn test_empty_latency() {
        let metrics = Metrics::new();
        assert_eq!(metrics.min_latency_us(), 0);
        assert_eq!(metrics.avg_latency_us(), 0.0);
    }
}
