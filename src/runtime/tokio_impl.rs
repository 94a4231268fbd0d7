//! Tokio async runtime implementation
//!
//! Provides integration with the Tokio async runtime.

use super::AsyncSpawner;
use std::future::Future;

/// Tokio-based async spawner
///
/// Spawns tasks on the runtime captured at construction, so it can be used
/// from a control loop thread that is not itself inside the runtime.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Spawner bound to the runtime of the calling context
    ///
    /// Panics outside a Tokio runtime, like `tokio::spawn` does.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_handle(tokio::runtime::Handle::current())
    }

    /// Spawner bound to a specific runtime
    pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Detached; productions report through the cache and result channel
        drop(self.handle.spawn(task));
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tokio_spawner() {
        let spawner = TokioSpawner::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();

        spawner.spawn(async move {
            ran_clone.store(true, Ordering::SeqCst);
        });

        // Give the task time to run
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tokio_spawner_from_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let spawner = TokioSpawner::with_handle(runtime.handle().clone());
        let (tx, rx) = crossbeam_channel::bounded(1);

        spawner.spawn(async move {
            let _ = tx.send(42u32);
        });

        let value = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(value, 42);
        assert_eq!(spawner.runtime_name(), "Tokio");
    }
}
