//! Async runtime abstraction for background productions
//!
//! Productions are futures handed to an [`AsyncSpawner`], so the pipeline
//! works on a plain thread per task, a Tokio runtime, or a test double.

pub mod mock;
pub mod thread;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// A boxed future that can be sent across threads
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async task spawner trait
///
/// Spawned tasks run detached: there is no join or cancel. The caller learns
/// about completion only through whatever side effects the task performs.
///
/// # Example
/// ```ignore
/// let spawner = ThreadSpawner::new();
/// spawner.spawn(async {
///     // Async work here
/// });
/// ```
pub trait AsyncSpawner: Send + Sync + Clone + Debug {
    /// Spawn a task that runs independently of the caller
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;
}

// Re-export implementations
pub use mock::{MockSpawnBehavior, MockSpawner};
pub use thread::ThreadSpawner;

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;
