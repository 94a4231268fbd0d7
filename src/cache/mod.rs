//! Position-keyed content cache with single-flight bookkeeping
//!
//! The cache owns every completed artifact for the lifetime of the process
//! and tracks which keys currently have a production running. There is no
//! eviction: memory grows with the number of distinct keys visited.

pub mod metrics;

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::artifact::ContentArtifact;
use crate::spatial::CacheKey;
use metrics::GenerationMetricsHandle;

/// Misuse of the begin/complete/fail protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Key {0} already has a production in flight")]
    AlreadyInFlight(CacheKey),

    #[error("Key {0} is already cached")]
    AlreadyCached(CacheKey),

    #[error("Key {0} has no production in flight")]
    NotInFlight(CacheKey),
}

#[derive(Debug, Default)]
struct CacheState {
    artifacts: HashMap<CacheKey, Arc<ContentArtifact>>,
    in_flight: HashSet<CacheKey>,
}

/// Shared handle to the artifact store and in-flight set
///
/// Clones refer to the same underlying cache, so the control loop and
/// background productions can each hold one.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    state: Arc<Mutex<CacheState>>,
    metrics: GenerationMetricsHandle,
}

impl ContentCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the artifact for `key` if one has been produced
    pub fn lookup(&self, key: CacheKey) -> Option<Arc<ContentArtifact>> {
        let found = self.state.lock().artifacts.get(&key).cloned();
        if found.is_some() {
            self.metrics.record_cache_hit();
        } else {
            self.metrics.record_cache_miss();
        }
        found
    }

    /// Whether `key` is cached, without touching hit/miss statistics
    pub fn contains(&self, key: CacheKey) -> bool {
        self.state.lock().artifacts.contains_key(&key)
    }

    pub fn is_in_flight(&self, key: CacheKey) -> bool {
        self.state.lock().in_flight.contains(&key)
    }

    /// Marks `key` in flight
    ///
    /// The cached and in-flight checks happen under the same lock as the
    /// insert, so two racing callers can never both succeed.
    pub fn begin(&self, key: CacheKey) -> Result<(), CacheError> {
        let mut state = self.state.lock();
        if state.artifacts.contains_key(&key) {
            return Err(CacheError::AlreadyCached(key));
        }
        if !state.in_flight.insert(key) {
            return Err(CacheError::AlreadyInFlight(key));
        }
        drop(state);

        self.metrics.record_started();
        Ok(())
    }

    /// Stores the artifact for `key` and clears its in-flight marker
    ///
    /// An artifact already stored for `key` is never replaced.
    pub fn complete(&self, key: CacheKey, artifact: ContentArtifact) -> Result<(), CacheError> {
        let mut state = self.state.lock();
        if !state.in_flight.remove(&key) {
            return Err(CacheError::NotInFlight(key));
        }
        state
            .artifacts
            .entry(key)
            .or_insert_with(|| Arc::new(artifact));
        drop(state);

        self.metrics.record_completed();
        Ok(())
    }

    /// Clears the in-flight marker for `key` without storing anything
    pub fn fail(&self, key: CacheKey) -> Result<(), CacheError> {
        if !self.state.lock().in_flight.remove(&key) {
            return Err(CacheError::NotInFlight(key));
        }
        self.metrics.record_failed();
        Ok(())
    }

    /// Number of cached artifacts
    pub fn len(&self) -> usize {
        self.state.lock().artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys with a production running
    pub fn in_flight_count(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    /// Total pixel bytes held by cached artifacts
    pub fn memory_usage(&self) -> usize {
        self.state
            .lock()
            .artifacts
            .values()
            .map(|a| a.byte_len())
            .sum()
    }

    /// Get a reference to the metrics handle
    pub fn metrics(&self) -> &GenerationMetricsHandle {
        &self.metrics
    }
}
