//! Deterministic stand-in producer
//!
//! Paints a vertical sky-to-ground gradient whose colours are derived from a
//! hash of the request text, so identical requests give identical images.

use image::{Rgba, RgbaImage};
use xxhash_rust::xxh3::xxh3_64;

use super::{ContentProducer, GenerationError};
use crate::prompt::ContentRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralProducer;

impl ProceduralProducer {
    pub fn new() -> Self {
        Self
    }

    /// Render synchronously; the async entry point delegates here
    pub fn render(
        &self,
        request: &ContentRequest,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GenerationError> {
        if width == 0 || height == 0 {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        if request.is_empty() {
            return Err(GenerationError::EmptyRequest);
        }

        let hash = xxh3_64(request.as_str().as_bytes()).to_le_bytes();
        let sky = [hash[0], hash[1], hash[2]];
        let ground = [hash[3], hash[4], hash[5]];
        // Longitude bands make yaw changes visible on the sphere
        let bands = u32::from(hash[6] % 7) + 1;

        Ok(RgbaImage::from_fn(width, height, |x, y| {
            let t = y as f32 / height.max(2).saturating_sub(1) as f32;
            let band = (x * bands / width) % 2 == 0;
            let shade = if band { 1.0 } else { 0.85 };
            let mix = |a: u8, b: u8| ((a as f32 * (1.0 - t) + b as f32 * t) * shade) as u8;
            Rgba([
                mix(sky[0], ground[0]),
                mix(sky[1], ground[1]),
                mix(sky[2], ground[2]),
                255,
            ])
        }))
    }
}

#[async_trait::async_trait]
impl ContentProducer for ProceduralProducer {
    async fn generate(
        &self,
        request: &ContentRequest,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GenerationError> {
        self.render(request, width, height)
    }

    fn name(&self) -> &str {
        "procedural"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_request_same_image() {
        let producer = ProceduralProducer::new();
        let request = ContentRequest::new("A serene beach");
        let a = producer.render(&request, 8, 4).unwrap();
        let b = producer.render(&request, 8, 4).unwrap();
        assert_eq!(a.dimensions(), (8, 4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_requests_differ() {
        let producer = ProceduralProducer::new();
        let a = producer
            .render(&ContentRequest::new("A serene beach"), 8, 4)
            .unwrap();
        let b = producer
            .render(&ContentRequest::new("An alien planet"), 8, 4)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_bad_input() {
        let producer = ProceduralProducer::new();
        assert!(matches!(
            producer.render(&ContentRequest::new("x"), 0, 4),
            Err(GenerationError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            producer.render(&ContentRequest::new(""), 4, 4),
            Err(GenerationError::EmptyRequest)
        ));
    }

    #[test]
    fn test_async_generate() {
        let producer = ProceduralProducer::new();
        let image = futures::executor::block_on(producer.generate(
            &ContentRequest::new("A dense forest"),
            4,
            4,
        ))
        .unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }
}
