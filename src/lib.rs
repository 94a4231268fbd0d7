//! vista_stream - Spatial content cache and async panorama generation
//!
//! A viewer walks a continuous 2-D grid of themed locations. Each position
//! maps to a blended text request; a slow external producer turns requests
//! into panoramas off the control loop, and a position-keyed cache makes sure
//! each spot is produced at most once at a time.
//!
//! # Features
//! - Bilinear prompt blending with a token budget
//! - Position-keyed cache with single-flight production per key
//! - Non-blocking result hand-off drained once per frame
//! - Async runtime abstraction (threads, Tokio, mock)
//!
//! # Quick Start
//!
//! ```ignore
//! use vista_stream::{ContentCache, GenerationCoordinator, ProceduralProducer, ThreadSpawner};
//!
//! let cache = ContentCache::new();
//! let coordinator = GenerationCoordinator::new(cache, ProceduralProducer::new(), ThreadSpawner::new());
//! ```
//!
//! # Feature Flags
//!
//! - `runtime-tokio`: Enable the Tokio spawner

// Core modules
pub mod cache;
pub mod coordinator;
pub mod prompt;
pub mod runtime;
pub mod spatial;
pub mod view;

// Support modules
pub mod artifact;
pub mod config;
pub mod control;
pub mod grid;
pub mod producer;

// Error types
mod error;
pub use error::{Result, VistaError};

// Re-export main types
pub use artifact::{ArtifactError, ContentArtifact};
pub use cache::metrics::{GenerationMetrics, GenerationMetricsHandle};
pub use cache::{CacheError, ContentCache};
pub use config::{ConfigError, WalkConfig};
pub use control::{
    ControlLoop, FrameInput, FrameReport, InputSource, LogRenderer, MoveKeys, Renderer,
    ScriptedInput,
};
pub use coordinator::GenerationCoordinator;
pub use grid::{GridError, PromptGrid};
pub use producer::{ContentProducer, GenerationError, ProceduralProducer};
pub use prompt::{BlendWeights, ContentRequest, SpatialPromptBlender, Tokenizer, WordTokenizer};
pub use spatial::{CacheKey, GridBounds, Orientation};
pub use view::{RegenerateOutcome, ViewState};

// Re-export runtime types
#[cfg(feature = "runtime-tokio")]
pub use runtime::TokioSpawner;
pub use runtime::{AsyncSpawner, MockSpawnBehavior, MockSpawner, ThreadSpawner};

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
