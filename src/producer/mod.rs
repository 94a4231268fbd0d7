//! External content producer interface
//!
//! A producer turns a content request into a panorama image. Real producers
//! (diffusion models, remote services) take seconds per call, have no retry
//! and are invoked off the control loop.

pub mod procedural;

pub use procedural::ProceduralProducer;

use image::RgbaImage;
use thiserror::Error;

use crate::prompt::ContentRequest;

/// Error type for a single production attempt
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Producer backend failed: {0}")]
    Backend(String),

    #[error("Invalid output dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Content request is empty")]
    EmptyRequest,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Produces one image per call
///
/// Uses async-trait for dyn compatibility
#[async_trait::async_trait]
pub trait ContentProducer: Send + Sync {
    /// Generate an image of `width × height` pixels for `request`
    async fn generate(
        &self,
        request: &ContentRequest,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GenerationError>;

    /// Short name used in log lines
    fn name(&self) -> &str {
        "producer"
    }
}
