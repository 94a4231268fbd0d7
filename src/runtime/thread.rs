//! One OS thread per task
//!
//! The default spawner: each production gets its own named thread that
//! drives the future to completion with a local executor.

use super::AsyncSpawner;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Spawns every task onto a fresh thread
#[derive(Clone, Debug, Default)]
pub struct ThreadSpawner {
    spawned: Arc<AtomicU64>,
}

impl ThreadSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks spawned so far
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl AsyncSpawner for ThreadSpawner {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.spawned.fetch_add(1, Ordering::Relaxed);
        let result = std::thread::Builder::new()
            .name(format!("vista-producer-{id}"))
            .spawn(move || futures::executor::block_on(task));

        // On failure the task is dropped unpolled, running its destructors
        if let Err(err) = result {
            log::error!("Failed to spawn producer thread: {err}");
        }
    }

    fn runtime_name(&self) -> &'static str {
        "Thread"
    }
}
