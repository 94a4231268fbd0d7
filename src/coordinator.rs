//! Background production and result hand-off
//!
//! The coordinator starts productions on an [`AsyncSpawner`] and collects
//! their artifacts through a channel that the control loop drains once per
//! frame. Failed productions never reach the channel; they release their key
//! directly so the next visit can retry. That includes tasks that panic or
//! are dropped by the spawner without running.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use crate::artifact::ContentArtifact;
use crate::cache::ContentCache;
use crate::producer::ContentProducer;
use crate::prompt::ContentRequest;
use crate::runtime::AsyncSpawner;
use crate::spatial::CacheKey;

/// Default output size of one panorama
pub const DEFAULT_IMAGE_SIZE: u32 = 512;

/// Releases an in-flight key unless the production handed its artifact over
///
/// Dropped with the task, so a producer error, a panic inside the producer
/// or a spawner that discards the task all free the key for a retry.
struct InFlightGuard {
    cache: ContentCache,
    key: CacheKey,
    armed: bool,
}

impl InFlightGuard {
    fn new(cache: ContentCache, key: CacheKey) -> Self {
        Self {
            cache,
            key,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if std::thread::panicking() {
            log::error!("Production for {} panicked; releasing key", self.key);
        }
        if let Err(err) = self.cache.fail(self.key) {
            log::warn!("{err}");
        }
    }
}

/// Owns the producer and the result channel
pub struct GenerationCoordinator<P: ContentProducer, S: AsyncSpawner> {
    cache: ContentCache,
    producer: Arc<P>,
    spawner: S,
    width: u32,
    height: u32,
    result_tx: Sender<(CacheKey, ContentArtifact)>,
    result_rx: Receiver<(CacheKey, ContentArtifact)>,
}

impl<P: ContentProducer + 'static, S: AsyncSpawner> GenerationCoordinator<P, S> {
    /// Creates a coordinator producing square 512-pixel panoramas
    pub fn new(cache: ContentCache, producer: P, spawner: S) -> Self {
        let (result_tx, result_rx) = unbounded();
        Self {
            cache,
            producer: Arc::new(producer),
            spawner,
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            result_tx,
            result_rx,
        }
    }

    /// Set the requested output size
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Start producing `request` for `key` without blocking
    ///
    /// Returns false, and does nothing, when `key` is already cached or
    /// already in flight.
    pub fn request(&self, key: CacheKey, request: ContentRequest) -> bool {
        if let Err(err) = self.cache.begin(key) {
            log::warn!("Skipping production request: {err}");
            return false;
        }

        log::info!(
            "Producing {key} on {} via {}: {request}",
            self.spawner.runtime_name(),
            self.producer.name()
        );

        let producer = Arc::clone(&self.producer);
        let results = self.result_tx.clone();
        let (width, height) = (self.width, self.height);
        // Owned by the task from here on, even before its first poll
        let guard = InFlightGuard::new(self.cache.clone(), key);

        self.spawner.spawn(async move {
            let start = Instant::now();
            let outcome = producer.generate(&request, width, height).await;
            guard.cache.metrics().record_production_time(start.elapsed());

            match outcome {
                Ok(image) => {
                    let artifact = ContentArtifact::from_image(key, image);
                    log::debug!("Production for {key} finished in {:?}", start.elapsed());
                    // The drain releases the key once the artifact is stored
                    if results.send((key, artifact)).is_ok() {
                        guard.disarm();
                    }
                }
                Err(err) => {
                    log::error!("Error during content generation for {key}: {err}");
                }
            }
        });

        true
    }

    /// Move every finished artifact into the cache without blocking
    ///
    /// Returns the keys that were completed, in delivery order.
    pub fn drain_into_cache(&self) -> Vec<CacheKey> {
        let mut completed = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok((key, artifact)) => match self.cache.complete(key, artifact) {
                    Ok(()) => completed.push(key),
                    Err(err) => log::warn!("Dropping delivered artifact: {err}"),
                },
                Err(TryRecvError::Empty) => break,
                // Unreachable while we hold a sender ourselves
                Err(TryRecvError::Disconnected) => break,
            }
        }
        completed
    }

    /// Number of results waiting to be drained
    pub fn pending_results(&self) -> usize {
        self.result_rx.len()
    }
}
