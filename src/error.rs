//! Error types for vista_stream

use thiserror::Error;

/// Main error type for the walk pipeline
#[derive(Error, Debug)]
pub enum VistaError {
    #[error("Grid error: {0}")]
    Grid(#[from] crate::grid::GridError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("Generation error: {0}")]
    Generation(#[from] crate::producer::GenerationError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] crate::artifact::ArtifactError),

    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, VistaError>;
