//! Mock async spawner for testing
//!
//! Provides a mock async spawner that can run tasks synchronously,
//! hold them until the test releases them, or drop them entirely.

use super::{AsyncSpawner, BoxFuture};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Spawn behavior for MockSpawner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSpawnBehavior {
    /// Drop tasks immediately (don't execute)
    Drop,
    /// Block on tasks synchronously using a simple executor
    BlockSync,
    /// Queue tasks until [`MockSpawner::run_pending`] is called
    Deferred,
}

/// Mock async spawner for testing
///
/// Clones share the deferred queue, so a test can keep one clone and
/// release tasks spawned through another.
#[derive(Clone)]
pub struct MockSpawner {
    behavior: MockSpawnBehavior,
    pending: Arc<Mutex<VecDeque<BoxFuture<'static, ()>>>>,
}

impl fmt::Debug for MockSpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSpawner")
            .field("behavior", &self.behavior)
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl Default for MockSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpawner {
    /// Create a new mock spawner that drops tasks
    pub fn new() -> Self {
        Self::with_behavior(MockSpawnBehavior::Drop)
    }

    /// Create a mock spawner with specific behavior
    pub fn with_behavior(behavior: MockSpawnBehavior) -> Self {
        Self {
            behavior,
            pending: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock spawner that runs tasks synchronously
    pub fn blocking() -> Self {
        Self::with_behavior(MockSpawnBehavior::BlockSync)
    }

    /// Create a mock spawner that queues tasks
    pub fn deferred() -> Self {
        Self::with_behavior(MockSpawnBehavior::Deferred)
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Discard every queued task without running it; returns how many were
    /// dropped
    pub fn clear_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.pending.lock());
        tasks.len()
    }

    /// Run the oldest queued task to completion; returns false if none queued
    pub fn run_next(&self) -> bool {
        // Pop before running so a task that spawns again does not deadlock
        let task = self.pending.lock().pop_front();
        match task {
            Some(task) => {
                futures::executor::block_on(task);
                true
            }
            None => false,
        }
    }

    /// Run every queued task, including ones queued while running; returns
    /// how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl AsyncSpawner for MockSpawner {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.behavior {
            MockSpawnBehavior::Drop => drop(task),
            MockSpawnBehavior::BlockSync => futures::executor::block_on(task),
            MockSpawnBehavior::Deferred => self.pending.lock().push_back(Box::pin(task)),
        }
    }

    fn runtime_name(&self) -> &'static str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn test_mock_spawner_drop() {
        let spawner = MockSpawner::new();
        spawner.spawn(async {
            panic!("Should not run");
        });
        assert_eq!(spawner.pending(), 0);
    }

    #[test]
    fn test_mock_spawner_blocking() {
        let spawner = MockSpawner::blocking();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        spawner.spawn(async move {
            ran_clone.store(true, Ordering::SeqCst);
        });

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_mock_spawner_deferred() {
        let spawner = MockSpawner::deferred();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = count.clone();
            spawner.clone().spawn(async move {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(spawner.pending(), 3);

        assert!(spawner.run_next());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert_eq!(spawner.run_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!spawner.run_next());
    }

    #[test]
    fn test_mock_spawner_clear_pending() {
        let spawner = MockSpawner::deferred();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        spawner.spawn(async move {
            ran_clone.store(true, Ordering::SeqCst);
        });

        assert_eq!(spawner.clear_pending(), 1);
        assert_eq!(spawner.pending(), 0);
        assert!(!spawner.run_next());
        assert!(!ran.load(Ordering::SeqCst));
    }
}
