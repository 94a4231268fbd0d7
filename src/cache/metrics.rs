use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks cache and production statistics
#[derive(Debug, Default)]
pub struct GenerationMetrics {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed: AtomicU64,
    last_production_time: RwLock<Option<Duration>>,
    total_production_time: RwLock<Duration>,
}

impl GenerationMetrics {
    /// Create a new instance of GenerationMetrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long one producer invocation took, successful or not
    pub fn record_production_time(&self, duration: Duration) {
        *self.last_production_time.write() = Some(duration);
        *self.total_production_time.write() += duration;
        self.timed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the cache hit rate as a percentage
    pub fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f32;
        let misses = self.cache_misses.load(Ordering::Relaxed) as f32;

        if hits + misses > 0.0 {
            hits / (hits + misses) * 100.0
        } else {
            0.0
        }
    }

    pub fn productions_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    pub fn productions_completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn productions_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn last_production_time(&self) -> Option<Duration> {
        *self.last_production_time.read()
    }

    /// Mean duration of every timed producer invocation
    pub fn average_production_time(&self) -> Option<Duration> {
        // Read the total first; a concurrent record can only shrink the mean
        let total = *self.total_production_time.read();
        let timed = self.timed.load(Ordering::Relaxed);
        if timed == 0 {
            return None;
        }
        Some(total / timed as u32)
    }
}

/// A thread-safe wrapper around GenerationMetrics
#[derive(Debug, Clone, Default)]
pub struct GenerationMetricsHandle(Arc<GenerationMetrics>);

impl GenerationMetricsHandle {
    /// Create a new metrics handle
    pub fn new() -> Self {
        Self(Arc::new(GenerationMetrics::new()))
    }

    /// Get a reference to the underlying metrics
    pub fn inner(&self) -> &GenerationMetrics {
        &self.0
    }
}

impl std::ops::Deref for GenerationMetricsHandle {
    type Target = GenerationMetrics;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let metrics = GenerationMetrics::new();
        assert_eq!(metrics.cache_hit_rate(), 0.0);

        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert_eq!(metrics.cache_hit_rate(), 75.0);
    }

    #[test]
    fn test_average_production_time() {
        let metrics = GenerationMetricsHandle::new();
        assert_eq!(metrics.average_production_time(), None);

        metrics.record_production_time(Duration::from_millis(100));
        metrics.record_completed();
        metrics.record_production_time(Duration::from_millis(300));
        metrics.record_failed();

        assert_eq!(metrics.last_production_time(), Some(Duration::from_millis(300)));
        assert_eq!(
            metrics.average_production_time(),
            Some(Duration::from_millis(200))
        );
    }

    #[test]
    fn test_average_ignores_undrained_results() {
        let metrics = GenerationMetrics::new();

        // Finished but not yet drained: no completion counted
        metrics.record_started();
        metrics.record_production_time(Duration::from_millis(40));
        assert_eq!(metrics.productions_completed(), 0);
        assert_eq!(
            metrics.average_production_time(),
            Some(Duration::from_millis(40))
        );

        metrics.record_started();
        metrics.record_production_time(Duration::from_millis(80));
        metrics.record_completed();
        assert_eq!(
            metrics.average_production_time(),
            Some(Duration::from_millis(60))
        );
    }
}
