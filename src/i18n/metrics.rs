//! Lookup metrics and observability.
//!
//! Counts catalog loads, cache usage, missing translations and formatting
//! failures. Instances are shared through `Arc` between the message sources
//! and the `Translator` that use them.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for message lookups.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Number of catalog files read from disk
    catalog_loads: AtomicUsize,

    /// Number of times loaded messages were found in the external cache
    cache_hits: AtomicUsize,

    /// Number of times the external cache had no entry
    cache_misses: AtomicUsize,

    /// Number of lookups that found no (or an empty) translation
    missing_translations: AtomicUsize,

    /// Number of messages the formatter could not format
    format_failures: AtomicUsize,
}

impl LookupMetrics {
    /// Create a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a catalog file read.
    pub fn record_catalog_load(&self) {
        self.catalog_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup without translation.
    pub fn record_missing_translation(&self) {
        self.missing_translations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a formatting failure.
    pub fn record_format_failure(&self) {
        self.format_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn catalog_loads(&self) -> usize {
        self.catalog_loads.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn missing_translations(&self) -> usize {
        self.missing_translations.load(Ordering::Relaxed)
    }

    pub fn format_failures(&self) -> usize {
        self.format_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            catalog_loads: self.catalog_loads(),
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            missing_translations: self.missing_translations(),
            format_failures: self.format_failures(),
        }
    }
}

/// Snapshot of the lookup counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub catalog_loads: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub missing_translations: usize,
    pub format_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // ==================== Counter Tests ====================

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = LookupMetrics::new();
        assert_eq!(metrics.catalog_loads(), 0);
        assert_eq!(metrics.cache_hits(), 0);
        assert_eq!(metrics.cache_misses(), 0);
        assert_eq!(metrics.missing_translations(), 0);
        assert_eq!(metrics.format_failures(), 0);
    }

    #[test]
    fn test_record_counters() {
        let metrics = LookupMetrics::new();
        metrics.record_catalog_load();
        metrics.record_catalog_load();
        metrics.record_missing_translation();
        metrics.record_format_failure();

        assert_eq!(metrics.catalog_loads(), 2);
        assert_eq!(metrics.missing_translations(), 1);
        assert_eq!(metrics.format_failures(), 1);
    }

    #[test]
    fn test_shared_instance_sees_updates() {
        let metrics = Arc::new(LookupMetrics::new());
        let other = Arc::clone(&metrics);
        other.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 1);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LookupMetrics::new().report();
        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_misses, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let metrics = LookupMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LookupMetrics::new();
        metrics.record_missing_translation();
        let json = serde_json::to_string(&metrics.report()).expect("Should serialize");
        assert!(json.contains("\"missing_translations\":1"));
    }
}
